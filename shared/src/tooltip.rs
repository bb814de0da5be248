use std::collections::HashMap;

/// Something that can show hover content for a region.
pub trait TooltipHost {
    type Handle;

    fn create(&mut self, name: &str, html: &str) -> Self::Handle;
    fn set_content(&mut self, handle: &mut Self::Handle, html: &str);
    fn destroy(&mut self, handle: Self::Handle);
}

/// Tooltip handles keyed by region name.
pub struct TooltipRegistry<H: TooltipHost> {
    handles: HashMap<String, H::Handle>,
}

impl<H: TooltipHost> Default for TooltipRegistry<H> {
    fn default() -> Self {
        Self {
            handles: HashMap::new(),
        }
    }
}

impl<H: TooltipHost> TooltipRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handles.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Redraw pass: every existing handle is destroyed, then a fresh one is
    /// created for each name whose content is `Some`.
    pub fn refresh<'a>(
        &mut self,
        host: &mut H,
        names: impl IntoIterator<Item = &'a str>,
        html: impl Fn(&str) -> Option<String>,
    ) {
        for (_, handle) in self.handles.drain() {
            host.destroy(handle);
        }
        for name in names {
            if let Some(content) = html(name) {
                let handle = host.create(name, &content);
                self.handles.insert(name.to_string(), handle);
            }
        }
    }

    /// Replace the content of existing tooltips without creating new ones.
    /// A tooltip whose content is now `None` is destroyed.
    pub fn update_contents(&mut self, host: &mut H, html: impl Fn(&str) -> Option<String>) {
        let mut gone = Vec::new();
        for (name, handle) in self.handles.iter_mut() {
            match html(name) {
                Some(content) => host.set_content(handle, &content),
                None => gone.push(name.clone()),
            }
        }
        for name in gone {
            if let Some(handle) = self.handles.remove(&name) {
                host.destroy(handle);
            }
        }
    }

    pub fn clear(&mut self, host: &mut H) {
        for (_, handle) in self.handles.drain() {
            host.destroy(handle);
        }
    }
}
