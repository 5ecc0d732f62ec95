//! Placeholder output names for intermediate files.

/// Extension used when the caller does not ask for one.
pub const DEFAULT_EXTENSION: &str = "tmp";

/// Issues unique intermediate paths under `${builddir}`.
///
/// The counter starts at 1 and is never reused within a session, so two
/// generated names never collide.
#[derive(Debug)]
pub struct NameGenerator {
    next: u64,
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl NameGenerator {
    /// Issue the next name with extension `ext`.
    pub fn next_name(&mut self, ext: &str) -> String {
        let index = self.next;
        self.next += 1;
        format!("${{builddir}}/.ninju_{index}.{ext}")
    }

    /// Issue `count` consecutive names.
    pub fn take(&mut self, count: usize, ext: &str) -> Vec<String> {
        (0..count).map(|_| self.next_name(ext)).collect()
    }

    /// Number of names issued so far.
    #[must_use]
    pub const fn issued(&self) -> u64 {
        self.next - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    fn first_name_uses_counter_one() {
        let mut names = NameGenerator::default();
        assert_eq!(names.next_name(DEFAULT_EXTENSION), "${builddir}/.ninju_1.tmp");
        assert_eq!(names.next_name("o"), "${builddir}/.ninju_2.o");
    }

    #[rstest]
    fn names_are_distinct() {
        let mut names = NameGenerator::default();
        let mut issued = names.take(3, "o");
        issued.extend(names.take(2, "o"));
        let unique: HashSet<_> = issued.iter().collect();
        assert_eq!(unique.len(), 5);
        assert_eq!(names.issued(), 5);
    }
}
