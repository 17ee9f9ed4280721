use anyhow::{Result, bail};
use std::io::{self, BufRead, IsTerminal};
use zeroize::Zeroizing;

pub const PASSPHRASE_ENV: &str = "TWOFAE_PASSPHRASE";

/// Reads the passphrase used to derive a new container's key.
///
/// Asks twice on an interactive terminal; piped input and the environment
/// variable are taken as-is.
pub fn read_new_passphrase_with_confirmation() -> Result<Zeroizing<String>> {
    //  Environment Variable
    //  TWOFAE_PASSPHRASE="supersecret" twofae encrypt notes.txt
    if let Ok(pw) = std::env::var(PASSPHRASE_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    //  stdin (Pipeline)
    //  printf "%s" "$SECRET" | twofae encrypt notes.txt
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().lock().read_line(&mut buf)?;
        trim_newline(&mut buf);

        if !buf.is_empty() {
            return Ok(buf);
        }

        bail!("No passphrase provided");
    }

    let pw1 = Zeroizing::new(rpassword::prompt_password("Passphrase: ")?);
    if pw1.is_empty() {
        bail!("passphrase cannot be empty");
    }

    let pw2 = Zeroizing::new(rpassword::prompt_password("Confirm passphrase: ")?);
    if pw1 != pw2 {
        bail!("passphrases do not match");
    }

    Ok(pw1)
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}
