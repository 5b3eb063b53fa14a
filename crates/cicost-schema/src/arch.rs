//! Target platform identifiers.
//!
//! Release archives exist for two operating systems and two CPU families.
//! Operating systems are matched strictly. Architectures are not: anything
//! that is not recognisably ARM is treated as `amd64`, which mirrors the
//! `Hardware::CPU.arm?` branch of the published Homebrew formula.
//!
//! # Example
//!
//! ```
//! use cicost_schema::{Arch, Os};
//!
//! assert_eq!(Arch::detect("aarch64"), Arch::Arm64);
//! assert_eq!(Arch::detect("riscv64"), Arch::Amd64);
//! assert_eq!("darwin".parse::<Os>().unwrap(), Os::MacOs);
//! ```

use thiserror::Error;

/// Errors produced when a platform string cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The operating system is not one release archives are built for.
    #[error("Unsupported operating system: {0}")]
    UnknownOs(String),

    /// The architecture is not one of the explicit spellings.
    #[error("Unknown architecture: {0}")]
    UnknownArch(String),
}

/// Operating system of the install target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// macOS (release assets are tagged `darwin`)
    #[serde(alias = "darwin")]
    MacOs,
    /// Linux
    Linux,
}

impl Os {
    /// All supported operating systems, in table order.
    pub const ALL: [Self; 2] = [Self::MacOs, Self::Linux];

    /// The operating system this binary was compiled for, if supported.
    pub fn current() -> Option<Self> {
        std::env::consts::OS.parse().ok()
    }

    /// Canonical name (`macos` / `linux`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MacOs => "macos",
            Self::Linux => "linux",
        }
    }

    /// Spelling used in release asset file names (`darwin` / `linux`).
    pub fn asset_token(&self) -> &'static str {
        match self {
            Self::MacOs => "darwin",
            Self::Linux => "linux",
        }
    }
}

impl std::fmt::Display for Os {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Os {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "macos" | "darwin" | "osx" | "mac" => Ok(Self::MacOs),
            "linux" => Ok(Self::Linux),
            _ => Err(PlatformError::UnknownOs(s.to_string())),
        }
    }
}

/// CPU architecture of the install target.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// 64-bit ARM (Apple Silicon, Graviton, Raspberry Pi 4+)
    #[serde(alias = "aarch64")]
    Arm64,
    /// 64-bit x86; also the fallback for every non-ARM CPU
    #[default]
    #[serde(alias = "x86_64")]
    Amd64,
}

impl Arch {
    /// All architectures, in table order.
    pub const ALL: [Self; 2] = [Self::Arm64, Self::Amd64];

    /// The architecture this binary was compiled for.
    pub fn current() -> Self {
        Self::detect(std::env::consts::ARCH)
    }

    /// Map a detected architecture name onto a release architecture.
    ///
    /// ARM is chosen only when `name` is recognisably ARM. Everything else,
    /// including unknown names, yields [`Arch::Amd64`]. Use
    /// [`Arch::is_recognized`] to find out whether the fallback was taken.
    pub fn detect(name: &str) -> Self {
        if is_arm(name) {
            Self::Arm64
        } else {
            Self::Amd64
        }
    }

    /// Whether `name` is an explicit spelling of a supported architecture.
    pub fn is_recognized(name: &str) -> bool {
        name.parse::<Self>().is_ok()
    }

    /// Name used in release asset file names (`arm64` / `amd64`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arm64 => "arm64",
            Self::Amd64 => "amd64",
        }
    }
}

fn is_arm(name: &str) -> bool {
    let name = name.trim().to_lowercase();
    name.starts_with("arm") || name.starts_with("aarch64")
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Arch {
    type Err = PlatformError;

    /// Strict parse: only explicit spellings are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "arm64" | "aarch64" | "armv8" | "arm" => Ok(Self::Arm64),
            "amd64" | "x86_64" | "x64" | "x86-64" => Ok(Self::Amd64),
            _ => Err(PlatformError::UnknownArch(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_parse_accepts_aliases() {
        assert_eq!("macos".parse::<Os>(), Ok(Os::MacOs));
        assert_eq!("Darwin".parse::<Os>(), Ok(Os::MacOs));
        assert_eq!("linux".parse::<Os>(), Ok(Os::Linux));
    }

    #[test]
    fn os_parse_rejects_windows() {
        assert_eq!(
            "windows".parse::<Os>(),
            Err(PlatformError::UnknownOs("windows".to_string()))
        );
    }

    #[test]
    fn asset_token_uses_darwin_for_macos() {
        assert_eq!(Os::MacOs.asset_token(), "darwin");
        assert_eq!(Os::Linux.asset_token(), "linux");
    }

    #[test]
    fn detect_selects_arm_only_when_explicit() {
        assert_eq!(Arch::detect("arm64"), Arch::Arm64);
        assert_eq!(Arch::detect("aarch64"), Arch::Arm64);
        assert_eq!(Arch::detect("armv7l"), Arch::Arm64);
        assert_eq!(Arch::detect("x86_64"), Arch::Amd64);
        assert_eq!(Arch::detect("riscv64"), Arch::Amd64);
        assert_eq!(Arch::detect(""), Arch::Amd64);
    }

    #[test]
    fn strict_parse_flags_unknown_names() {
        assert!(Arch::is_recognized("amd64"));
        assert!(Arch::is_recognized("AARCH64"));
        assert!(!Arch::is_recognized("riscv64"));
        assert!(!Arch::is_recognized("ppc64le"));
    }

    #[test]
    fn serde_uses_lowercase_names() {
        #[derive(serde::Deserialize)]
        struct Row {
            os: Os,
            arch: Arch,
        }
        let row: Row = toml::from_str("os = \"darwin\"\narch = \"aarch64\"").unwrap();
        assert_eq!(row.os, Os::MacOs);
        assert_eq!(row.arch, Arch::Arm64);
    }
}
