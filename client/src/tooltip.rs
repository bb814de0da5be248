use leptos::prelude::*;

use crate::app::{Hovered, MousePos};
use crate::controller::MapController;

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Tooltip that follows the cursor while a region with tooltip content is hovered.
#[component]
pub fn HoverTooltip() -> impl IntoView {
    let Hovered(hovered) = expect_context();
    let MousePos(mouse_pos) = expect_context();
    let controller: MapController = expect_context();

    let content = Memo::new(move |_| {
        let name = hovered.get()?;
        controller
            .tooltip_contents
            .with(|contents| contents.get(&name).cloned())
    });

    view! {
        {move || {
            let Some(html) = content.get() else {
                return view! { <div style="display:none;" /> }.into_any();
            };
            let (x, y) = mouse_pos.get();
            view! {
                <div
                    class="ukmap-tooltip"
                    style:left=format!("{}px", x + 14.0)
                    style:top=format!("{}px", y - 10.0)
                    style="position: fixed; pointer-events: none; z-index: 100; background: #ffffff; border: 1px solid #d7d7d7; border-radius: 4px; box-shadow: 0 2px 8px rgba(0,0,0,0.15); padding: 6px 9px; font-family: system-ui, sans-serif; font-size: 0.8rem; color: #222; max-width: 220px;"
                    inner_html=html
                />
            }
                .into_any()
        }}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("Bath"), "Bath");
    }
}
