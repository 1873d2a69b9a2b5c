//! Descriptor (feed) document rendering.
//!
//! The descriptor is an ad-hoc `<interface>` document handed to the
//! external resolver. It carries two implementation variants sharing
//! byte-identical requirement clauses: a prebuilt one with no build
//! command, and a `*-src` one whose `compile` command is an intentional
//! no-op (it exists only because the tool chain requires one; real
//! compilation is the autocompile driver's side effect).
//!
//! Rendering is a pure function of the requirement list: no randomness,
//! no environment reads. Interface URLs and version strings are embedded
//! verbatim with no escaping — a caller-supplied value containing XML
//! metacharacters produces a malformed document, which is the documented
//! behavior, not an oversight.

use std::fmt::Write;

/// XML namespace of the injector interface format.
pub const FEED_XMLNS: &str = "http://zero-install.sourceforge.net/2004/injector/interface";

/// Runner interface for the no-op compile command.
pub const COMPILE_RUNNER_FEED: &str = "http://repo.roscidus.com/python/python";

/// An exact-version pin against one feed URL.
///
/// Rendered as a half-open range: not before `version`, before
/// `version-post` (the immediate successor in the resolver's ordering).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Feed URL the requirement applies to.
    pub interface: String,

    /// Exact version to pin.
    pub version: String,
}

impl Requirement {
    /// Pin `interface` to exactly `version`.
    pub fn exact(interface: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            version: version.into(),
        }
    }

    /// The `<requires>` clause for this pin.
    pub fn to_xml(&self) -> String {
        format!(
            "    <requires interface='{iface}'>\n      <version not-before='{ver}' before='{ver}-post'/>\n    </requires>\n",
            iface = self.interface,
            ver = self.version,
        )
    }
}

/// Render the full descriptor document for the given requirement list.
///
/// Both implementation variants receive the same requirement text; the
/// shared block is built once and inserted twice, so the variants can
/// never drift apart.
pub fn render_descriptor(requirements: &[Requirement]) -> String {
    let mut requires = String::new();
    for req in requirements {
        requires.push_str(&req.to_xml());
    }

    let mut doc = String::new();
    let _ = writeln!(doc, "<?xml version='1.0' ?>");
    let _ = writeln!(doc, "<interface xmlns='{FEED_XMLNS}'>");
    let _ = writeln!(doc, "  <name>deps</name>");
    let _ = writeln!(doc, "  <summary>deps</summary>");
    let _ = writeln!(doc, "  <description></description>");
    let _ = writeln!(doc, "  <implementation version='0.1' id='.'>");
    doc.push_str(&requires);
    let _ = writeln!(doc, "  </implementation>");
    let _ = writeln!(doc, "  <implementation arch='*-src' version='0.1' id='..'>");
    doc.push_str(&requires);
    let _ = writeln!(doc, "    <command name='compile'>");
    let _ = writeln!(doc, "      <runner interface='{COMPILE_RUNNER_FEED}'/>");
    let _ = writeln!(doc, "      <arg>-c</arg>");
    let _ = writeln!(doc, "      <arg>'noop'</arg>");
    let _ = writeln!(doc, "    </command>");
    let _ = writeln!(doc, "  </implementation>");
    let _ = writeln!(doc, "</interface>");
    doc
}
