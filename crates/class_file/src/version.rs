/// First major version in [`JDK_NAMES`].
const FIRST_MAJOR: u16 = 45;

const JDK_NAMES: [&str; 24] = [
    "1.1", "1.2", "1.3", "1.4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16",
    "17", "18", "19", "20", "21", "22", "23", "24",
];

pub const UNKNOWN_VERSION: &str = "unknown";

/// JDK release that produces a given class file major version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JdkVersion {
    major: u16,
    name: &'static str,
}
impl JdkVersion {
    pub fn from_major(major: u16) -> Option<Self> {
        let name = JDK_NAMES.get(usize::from(major.checked_sub(FIRST_MAJOR)?))?;
        Some(Self { major, name })
    }

    pub fn major_version(&self) -> u16 {
        self.major
    }

    /// The release name, like `1.4` or `17`.
    pub fn jdk_string(&self) -> &'static str {
        self.name
    }

    /// The release name with the minor version appended, unless the name
    /// already carries one.
    pub fn make_jdk_string(&self, minor: u16) -> String {
        if self.name.contains('.') {
            self.name.to_owned()
        } else {
            format!("{}.{}", self.name, minor)
        }
    }
}
