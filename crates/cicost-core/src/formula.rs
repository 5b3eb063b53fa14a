//! Homebrew formula generation.
//!
//! Renders the `Formula/cicost.rb` published alongside each release from the
//! same table the installer uses, so the two never disagree on URLs or
//! digests.

use cicost_schema::{Arch, Os, ReleaseDescriptor, ReleaseTable, parse_version};

use crate::BINARY_NAME;
use crate::error::InstallError;

/// Static metadata of the formula.
#[derive(Debug, Clone)]
pub struct FormulaMeta {
    pub class_name: String,
    pub desc: String,
    pub homepage: String,
}

impl Default for FormulaMeta {
    fn default() -> Self {
        Self {
            class_name: "Cicost".to_string(),
            desc: "GitHub Actions cost and waste hotspot analyzer".to_string(),
            homepage: "https://github.com/peter941221/CICost".to_string(),
        }
    }
}

/// Render the formula for one version of the table.
///
/// Platforms without a row are left out; an OS with only one architecture
/// gets a one-sided `Hardware::CPU.arm?` guard.
pub fn render(
    table: &ReleaseTable,
    version: &str,
    meta: &FormulaMeta,
) -> Result<String, InstallError> {
    let parsed = parse_version(version)?;
    if !table.has_version(&parsed) {
        return Err(InstallError::UnknownVersion {
            version: parsed.to_string(),
            available: table
                .versions()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    let mut formula = format!(
        "class {} < Formula\n  desc \"{}\"\n  homepage \"{}\"\n  version \"{}\"\n",
        meta.class_name, meta.desc, meta.homepage, parsed
    );

    for os in Os::ALL {
        let arm = table.get(&parsed, os, Arch::Arm64);
        let intel = table.get(&parsed, os, Arch::Amd64);
        if arm.is_none() && intel.is_none() {
            continue;
        }

        formula.push_str(&format!("\n  on_{} do\n", os.as_str()));
        match (arm, intel) {
            (Some(arm), Some(intel)) => {
                formula.push_str("    if Hardware::CPU.arm?\n");
                push_source(&mut formula, arm);
                formula.push_str("    else\n");
                push_source(&mut formula, intel);
                formula.push_str("    end\n");
            }
            (Some(arm), None) => {
                formula.push_str("    if Hardware::CPU.arm?\n");
                push_source(&mut formula, arm);
                formula.push_str("    end\n");
            }
            (None, Some(intel)) => {
                formula.push_str("    unless Hardware::CPU.arm?\n");
                push_source(&mut formula, intel);
                formula.push_str("    end\n");
            }
            (None, None) => {}
        }
        formula.push_str("  end\n");
    }

    formula.push_str(&format!(
        "\n  def install\n    bin.install \"{BINARY_NAME}\"\n  end\n"
    ));
    // Ruby interpolation: the output needs a literal #{bin}
    formula.push_str(&format!(
        "\n  test do\n    assert_match \"{BINARY_NAME}\", shell_output(\"#{{bin}}/{BINARY_NAME} version\")\n  end\nend\n"
    ));

    Ok(formula)
}

fn push_source(formula: &mut String, d: &ReleaseDescriptor) {
    formula.push_str(&format!(
        "      url \"{}\"\n      sha256 \"{}\"\n",
        d.url, d.sha256
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use cicost_schema::ReleaseManifest;

    fn table(rows: &[(&str, &str, char)]) -> ReleaseTable {
        let mut doc = String::from(
            "[[release]]\nversion = \"0.2.0\"\nurl_template = \"https://github.com/peter941221/CICost/releases/download/v{version}/cicost_{version}_{os}_{arch}.tar.gz\"\n",
        );
        for (os, arch, fill) in rows {
            doc.push_str(&format!(
                "\n[[release.artifact]]\nos = \"{os}\"\narch = \"{arch}\"\nsha256 = \"{}\"\n",
                fill.to_string().repeat(64)
            ));
        }
        ReleaseManifest::from_toml(&doc).unwrap().into_table().unwrap()
    }

    #[test]
    fn renders_all_four_platforms() {
        let t = table(&[
            ("macos", "arm64", 'a'),
            ("macos", "amd64", 'b'),
            ("linux", "arm64", 'c'),
            ("linux", "amd64", 'd'),
        ]);
        let rb = render(&t, "0.2.0", &FormulaMeta::default()).unwrap();

        assert!(rb.starts_with("class Cicost < Formula\n"));
        assert!(rb.contains("  version \"0.2.0\"\n"));
        assert!(rb.contains("on_macos do"));
        assert!(rb.contains("on_linux do"));
        assert!(rb.contains("cicost_0.2.0_darwin_arm64.tar.gz"));
        assert!(rb.contains("cicost_0.2.0_linux_amd64.tar.gz"));
        assert!(rb.contains(&format!("sha256 \"{}\"", "d".repeat(64))));
        assert_eq!(rb.matches("if Hardware::CPU.arm?").count(), 2);
        assert!(rb.contains("bin.install \"cicost\""));
        assert!(rb.contains("shell_output(\"#{bin}/cicost version\")"));
        assert!(rb.ends_with("end\nend\n"));
    }

    #[test]
    fn skips_missing_platforms() {
        let t = table(&[("linux", "arm64", 'c')]);
        let rb = render(&t, "0.2.0", &FormulaMeta::default()).unwrap();

        assert!(!rb.contains("on_macos"));
        assert!(rb.contains("on_linux do\n    if Hardware::CPU.arm?\n"));
        assert!(!rb.contains("else"));
    }

    #[test]
    fn intel_only_uses_unless() {
        let t = table(&[("macos", "amd64", 'b')]);
        let rb = render(&t, "0.2.0", &FormulaMeta::default()).unwrap();
        assert!(rb.contains("unless Hardware::CPU.arm?"));
    }

    #[test]
    fn unknown_version_is_an_error() {
        let t = table(&[("linux", "arm64", 'c')]);
        let err = render(&t, "0.1.0", &FormulaMeta::default()).unwrap_err();
        assert!(matches!(err, InstallError::UnknownVersion { .. }));
    }
}
