use desk_audit_core::Confirm;
use std::io::{self, Write};

/// Reads the answer from stdin. Validation happens in the core.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        let mut input = String::new();
        print!("{} (y/n): ", prompt);
        io::stdout().flush()?;
        io::stdin().read_line(&mut input)?;
        Ok(input)
    }
}
