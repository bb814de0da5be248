use std::fmt;
use std::rc::Rc;

use crate::colors::Rgb;

pub type TooltipHtmlFn = Rc<dyn Fn(&str) -> Option<String>>;
pub type FeatureClickFn = Rc<dyn Fn(&str)>;
pub type ColorFn = Rc<dyn Fn(&str) -> Rgb>;

/// Caller-supplied behavior, kept apart from the plain-data [`MapConfig`].
///
/// [`MapConfig`]: crate::config::MapConfig
#[derive(Clone, Default)]
pub struct MapHooks {
    get_tooltip_html: Option<TooltipHtmlFn>,
    on_feature_click: Option<FeatureClickFn>,
    on_color: Option<ColorFn>,
}

impl MapHooks {
    pub fn with_tooltip_html(mut self, f: impl Fn(&str) -> Option<String> + 'static) -> Self {
        self.get_tooltip_html = Some(Rc::new(f));
        self
    }

    pub fn with_feature_click(mut self, f: impl Fn(&str) + 'static) -> Self {
        self.on_feature_click = Some(Rc::new(f));
        self
    }

    pub fn with_color(mut self, f: impl Fn(&str) -> Rgb + 'static) -> Self {
        self.on_color = Some(Rc::new(f));
        self
    }

    /// `None` when no hook is set or the hook declines.
    pub fn tooltip_html(&self, name: &str) -> Option<String> {
        self.get_tooltip_html.as_ref().and_then(|f| f(name))
    }

    pub fn feature_clicked(&self, name: &str) {
        if let Some(f) = &self.on_feature_click {
            f(name);
        }
    }

    pub fn color(&self, name: &str) -> Option<Rgb> {
        self.on_color.as_ref().map(|f| f(name))
    }
}

impl fmt::Debug for MapHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapHooks")
            .field("get_tooltip_html", &self.get_tooltip_html.is_some())
            .field("on_feature_click", &self.on_feature_click.is_some())
            .field("on_color", &self.on_color.is_some())
            .finish()
    }
}
