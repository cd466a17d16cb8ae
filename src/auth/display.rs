//! Operator-facing presentation of a pending device login.

use std::io::{self, Write};

use super::device_code::DeviceAuthorizationSession;

/// Show the verification URL, the user code and the complete URL.
///
/// Must run before polling starts so the operator can finish the login.
pub fn render<W: Write>(session: &DeviceAuthorizationSession, out: &mut W) -> io::Result<()> {
    writeln!(out, "Visit this url to login: {}", session.verification_uri)?;
    writeln!(out, "Enter the following device code: {}", session.user_code)?;
    writeln!(out, "Or visit this url: {}", session.verification_uri_complete)?;
    match session.expires_at() {
        Some(at) => writeln!(
            out,
            "The code expires in {}s (at {}).",
            session.expires_in,
            at.format("%H:%M:%S UTC")
        )?,
        None => writeln!(out, "The code expires in {}s.", session.expires_in)?,
    }
    out.flush()
}
