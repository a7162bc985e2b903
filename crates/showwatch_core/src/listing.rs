/// One theatre listed on a booking page at observation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TheatreObservation {
    name: String,
    show_count: u32,
}

impl TheatreObservation {
    /// Returns `None` when the name is empty after trimming.
    pub fn new(name: &str, show_count: u32) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            show_count,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn show_count(&self) -> u32 {
        self.show_count
    }
}
