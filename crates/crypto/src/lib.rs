use anyhow::{anyhow, Context, Result};
use ring::rand::{SecureRandom, SystemRandom};
use secrecy::{SecretString, SecretVec};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;
use zeroize::Zeroizing;

/// Characters a generated signing secret is drawn from.
pub const SECRET_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+[]{}|;:,.<>?/";
pub const SECRET_LEN: usize = 40;

/// Reads x25519 identities, one per line; blank lines and `#` comments are skipped.
pub fn load_identities(path: &Path) -> Result<Vec<age::x25519::Identity>> {
    let text = Zeroizing::new(
        std::fs::read_to_string(path).with_context(|| format!("open identity {}", path.display()))?,
    );
    let mut ids = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let id = age::x25519::Identity::from_str(line)
            .map_err(|e| anyhow!("{}:{}: {e}", path.display(), n + 1))?;
        ids.push(id);
    }
    if ids.is_empty() {
        anyhow::bail!("no age identities in {}", path.display());
    }
    debug!(path = %path.display(), count = ids.len(), "loaded age identities");
    Ok(ids)
}

pub fn decrypt_age_bytes(rdr: impl Read, ids: &[age::x25519::Identity]) -> Result<SecretVec<u8>> {
    let decryptor = age::Decryptor::new(rdr).context("read age header")?;
    let mut plain = decryptor
        .decrypt(ids.iter().map(|i| i as &dyn age::Identity))
        .context("no identity matches the file's recipients")?;
    let mut out = Vec::new();
    plain.read_to_end(&mut out).context("decrypt age payload")?;
    Ok(SecretVec::new(out))
}

/// A random secret of [`SECRET_LEN`] characters from [`SECRET_ALPHABET`].
///
/// Bytes at or above the largest multiple of the alphabet size are rejected so
/// every character is equally likely.
pub fn generate_signing_secret() -> Result<SecretString> {
    let rng = SystemRandom::new();
    let n = SECRET_ALPHABET.len();
    let limit = 256 - 256 % n;
    let mut out = Zeroizing::new(String::with_capacity(SECRET_LEN));
    let mut buf = Zeroizing::new([0u8; 64]);

    while out.len() < SECRET_LEN {
        rng.fill(&mut buf[..]).map_err(|_| anyhow!("system random source unavailable"))?;
        for &b in buf.iter().filter(|&&b| usize::from(b) < limit) {
            if out.len() == SECRET_LEN {
                break;
            }
            out.push(char::from(SECRET_ALPHABET[usize::from(b) % n]));
        }
    }
    Ok(SecretString::new(out.as_str().to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;

    // 32 bytes of 0x42.
    const TEST_IDENTITY: &str = "AGE-SECRET-KEY-1GFPYYSJZGFPYYSJZGFPYYSJZGFPYYSJZGFPYYSJZGFPYYSJZGFPQ4EGAEX";

    #[test]
    fn secret_has_fixed_length_and_alphabet() {
        let s = generate_signing_secret().unwrap();
        let s = s.expose_secret();
        assert_eq!(s.len(), SECRET_LEN);
        assert!(s.bytes().all(|b| SECRET_ALPHABET.contains(&b)));
    }

    #[test]
    fn secrets_differ() {
        let a = generate_signing_secret().unwrap();
        let b = generate_signing_secret().unwrap();
        assert_ne!(a.expose_secret(), b.expose_secret());
    }

    #[test]
    fn identities_skip_comments() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "# created: test\n\n{TEST_IDENTITY}").unwrap();
        assert_eq!(load_identities(f.path()).unwrap().len(), 1);
    }

    #[test]
    fn empty_identity_file_is_an_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "# nothing here").unwrap();
        assert!(load_identities(f.path()).is_err());
    }

    #[test]
    fn decrypts_for_matching_identity() {
        let id = age::x25519::Identity::from_str(TEST_IDENTITY).unwrap();
        let sealed = age::encrypt(&id.to_public(), b"environment: prod\n").unwrap();
        let plain = decrypt_age_bytes(&sealed[..], &[id]).unwrap();
        assert_eq!(plain.expose_secret().as_slice(), b"environment: prod\n");

        let other = age::x25519::Identity::generate();
        assert!(decrypt_age_bytes(&sealed[..], &[other]).is_err());
    }
}
