use std::fmt;

use rand::Rng;

const PASSWORD_ALPHABET: &[u8] =
    b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghjkmnpqrstuvwxyz23456789!@#$%^&*";
const GENERATED_LEN: usize = 16;

/// A password that lives for exactly one request.
///
/// Not `Serialize`, redacted in `Debug`, and the buffer is overwritten on drop.
/// Callers move it into the request with [`OneTimePassword::expose`] and the
/// value is gone once that request resolves.
#[derive(Default)]
pub struct OneTimePassword(String);

impl OneTimePassword {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// 16 random characters, same alphabet as the web dashboard.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let value = (0..GENERATED_LEN)
            .map(|_| PASSWORD_ALPHABET[rng.gen_range(0..PASSWORD_ALPHABET.len())] as char)
            .collect();
        Self(value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn push(&mut self, ch: char) {
        self.0.push(ch);
    }

    pub fn pop(&mut self) {
        self.0.pop();
    }

    /// Move the value out, leaving this holder empty.
    pub fn take(&mut self) -> OneTimePassword {
        OneTimePassword(std::mem::take(&mut self.0))
    }

    pub fn clear(&mut self) {
        wipe(&mut self.0);
    }

    /// Borrow the plaintext for building a single request body.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Asterisks for display.
    pub fn masked(&self) -> String {
        "*".repeat(self.len())
    }
}

fn wipe(value: &mut String) {
    // 等长替换是原地写入，不会重新分配
    let len = value.len();
    value.replace_range(.., &"\0".repeat(len));
    value.clear();
}

impl Drop for OneTimePassword {
    fn drop(&mut self) {
        wipe(&mut self.0);
    }
}

impl fmt::Debug for OneTimePassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OneTimePassword(<redacted>)")
    }
}

impl fmt::Display for OneTimePassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_leaves_holder_empty() {
        let mut holder = OneTimePassword::new("hunter22");
        let taken = holder.take();
        assert!(holder.is_empty());
        assert_eq!(taken.expose(), "hunter22");
    }

    #[test]
    fn test_debug_is_redacted() {
        let pw = OneTimePassword::new("hunter22");
        assert!(!format!("{:?}", pw).contains("hunter22"));
        assert_eq!(pw.to_string(), "<redacted>");
    }

    #[test]
    fn test_generate_uses_alphabet() {
        let pw = OneTimePassword::generate();
        assert_eq!(pw.len(), 16);
        assert!(pw.expose().bytes().all(|b| PASSWORD_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_masked_and_edit() {
        let mut pw = OneTimePassword::default();
        pw.push('a');
        pw.push('b');
        pw.pop();
        assert_eq!(pw.masked(), "*");
        pw.clear();
        assert!(pw.is_empty());
    }
}
