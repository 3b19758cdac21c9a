#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    file: TestFile,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, file: TestFile) -> Self {
        Self { name, group, file }
    }

    pub fn small(name: &'static str, file: TestFile) -> Self {
        Self::new(name, TestGroup::Small, file)
    }

    pub fn large(name: &'static str, file: TestFile) -> Self {
        Self::new(name, TestGroup::Large, file)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn file(&self) -> &TestFile {
        &self.file
    }

    pub fn file_name(&self) -> &'static str {
        self.file().file_name
    }
}

/// A fixture compiled into the benchmark binary with `include_str!`.
#[derive(Debug, Copy, Clone)]
pub struct TestFile {
    file_name: &'static str,
    content: &'static str,
}

impl TestFile {
    pub const fn new(file_name: &'static str, content: &'static str) -> Self {
        Self { file_name, content }
    }

    /// The file content without the trailing newline.
    pub fn content(&self) -> &'static str {
        self.content.trim_end_matches(['\r', '\n'])
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }

    /// Splits a header fixture into `(name, value)` pairs, one `Name: value` field per line.
    pub fn header_fields(&self) -> Vec<(&'static str, &'static str)> {
        self.content().lines().filter_map(|line| line.split_once(':')).collect()
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Large,
}
