/// Bounded stack of focused node ids, most recent last.
#[derive(Clone, Debug)]
pub struct NavigationHistory {
    entries: Vec<String>,
    limit: usize,
}

impl NavigationHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Pushes `id` unless it is already on top. The oldest entry is dropped past the limit.
    pub fn push(&mut self, id: &str) {
        if self.top() == Some(id) {
            return;
        }
        self.entries.push(id.to_owned());
        if self.entries.len() > self.limit {
            let overflow = self.entries.len() - self.limit;
            self.entries.drain(..overflow);
        }
    }

    pub fn pop(&mut self) -> Option<String> {
        self.entries.pop()
    }

    pub fn top(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries from most recent to oldest.
    pub fn recent(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().rev().map(String::as_str)
    }
}
