// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

//! Key material as `KEY=VALUE` environment fragments, the format of the `.env.public` and
//! `.env.private` files written at poll setup.
//!
//! Values are big-endian hex without a prefix. The public fragment is safe to publish; the private
//! one must only ever reach the decrypting process.

use std::fmt;

use zeroize::Zeroizing;

use crate::encoding::{from_hex, to_hex};
use crate::{PrivateKey, PublicKey, Result, SanityCheckError};

pub const PUBLIC_KEY_N: &str = "PUBLIC_KEY_N";
pub const PUBLIC_KEY_G: &str = "PUBLIC_KEY_G";
pub const PRIVATE_KEY_LAMBDA: &str = "PRIVATE_KEY_LAMBDA";
pub const PRIVATE_KEY_MU: &str = "PRIVATE_KEY_MU";

/// Public variables may also be exposed under this prefix, for front ends that only forward prefixed
/// variables to the client.
const PUBLIC_VARIABLE_PREFIX: &str = "NEXT_PUBLIC_";

/// An ordered set of `KEY=VALUE` pairs.
///
/// Values are zeroized on drop and never printed by `Debug`, as a fragment may hold private key
/// material.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EnvFragment {
    entries: Vec<(String, Zeroizing<String>)>,
}

impl EnvFragment {
    pub fn new() -> EnvFragment {
        EnvFragment::default()
    }

    /// Parses `KEY=VALUE` lines. Blank lines and `#` comments are skipped, an optional `export ` is
    /// ignored, and values may be wrapped in single or double quotes.
    pub fn parse(text: &str) -> Result<EnvFragment> {
        let mut fragment = EnvFragment::new();

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line
                .split_once('=')
                .ok_or(SanityCheckError::MalformedConfiguration { line: index + 1 })?;

            let key = key.trim();
            if key.is_empty() || key.contains(char::is_whitespace) {
                return Err(SanityCheckError::MalformedConfiguration { line: index + 1 }.into());
            }

            fragment.insert(key, unquote(value.trim()));
        }

        Ok(fragment)
    }

    /// Collects those of `keys` that are set in the process environment.
    pub fn from_process_env(keys: &[&str]) -> EnvFragment {
        let mut fragment = EnvFragment::new();

        for key in keys {
            if let Ok(value) = std::env::var(key) {
                fragment.insert(key, value.as_str());
            }
        }

        fragment
    }

    /// Sets `key`, replacing any previous value.
    pub fn insert(&mut self, key: &str, value: &str) {
        let value = Zeroizing::new(value.to_string());

        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| SanityCheckError::MissingConfiguration(key.to_string()).into())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// One `KEY=VALUE` line per entry, in insertion order.
    pub fn render(&self) -> Zeroizing<String> {
        let mut rendered = Zeroizing::new(String::new());

        for (key, value) in &self.entries {
            rendered.push_str(key);
            rendered.push('=');
            rendered.push_str(value);
            rendered.push('\n');
        }

        rendered
    }

    fn get_public(&self, key: &str) -> Result<&str> {
        self.get(key)
            .or_else(|| self.get(&format!("{PUBLIC_VARIABLE_PREFIX}{key}")))
            .ok_or_else(|| SanityCheckError::MissingConfiguration(key.to_string()).into())
    }
}

impl fmt::Debug for EnvFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvFragment")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(unquoted) = value
            .strip_prefix(quote)
            .and_then(|value| value.strip_suffix(quote))
        {
            return unquoted;
        }
    }

    value
}

impl PublicKey {
    /// Reads `PUBLIC_KEY_N` and `PUBLIC_KEY_G`, also accepting their `NEXT_PUBLIC_`-prefixed forms.
    pub fn from_env_fragment(fragment: &EnvFragment) -> Result<PublicKey> {
        let n = from_hex(fragment.get_public(PUBLIC_KEY_N)?)?;
        let g = from_hex(fragment.get_public(PUBLIC_KEY_G)?)?;

        PublicKey::new(n, g)
    }

    pub fn to_env_fragment(&self) -> EnvFragment {
        let mut fragment = EnvFragment::new();
        fragment.insert(PUBLIC_KEY_N, &to_hex(self.n()));
        fragment.insert(PUBLIC_KEY_G, &to_hex(self.g()));

        fragment
    }
}

impl PrivateKey {
    /// Reads `PRIVATE_KEY_LAMBDA` and `PRIVATE_KEY_MU` and binds them to `public_key`.
    pub fn from_env_fragment(public_key: PublicKey, fragment: &EnvFragment) -> Result<PrivateKey> {
        let lambda = Zeroizing::new(from_hex(fragment.require(PRIVATE_KEY_LAMBDA)?)?);
        let mu = Zeroizing::new(from_hex(fragment.require(PRIVATE_KEY_MU)?)?);

        PrivateKey::new(public_key, *lambda, *mu)
    }

    pub fn to_env_fragment(&self) -> EnvFragment {
        let mut fragment = EnvFragment::new();
        fragment.insert(PRIVATE_KEY_LAMBDA, &Zeroizing::new(to_hex(self.lambda())));
        fragment.insert(PRIVATE_KEY_MU, &Zeroizing::new(to_hex(self.mu())));

        fragment
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::test_exports::{private_key, public_key, LAMBDA, MU, N};
    use crate::{Error, KeyPair, PaillierModulusSizedNumber};

    #[test]
    fn parses_fragments() {
        let fragment = EnvFragment::parse(
            "# poll 7\n\nPUBLIC_KEY_N=abc\nexport PUBLIC_KEY_G = \"0x1\"\nEMPTY=\nQUOTED='x=y'",
        )
        .unwrap();

        assert_eq!(fragment.get("PUBLIC_KEY_N"), Some("abc"));
        assert_eq!(fragment.get("PUBLIC_KEY_G"), Some("0x1"));
        assert_eq!(fragment.get("EMPTY"), Some(""));
        assert_eq!(fragment.get("QUOTED"), Some("x=y"));
        assert_eq!(fragment.get("MISSING"), None);
        assert_eq!(
            fragment.require("MISSING"),
            Err(Error::SanityCheckError(
                SanityCheckError::MissingConfiguration("MISSING".to_string())
            ))
        );
    }

    #[rstest]
    #[case("PUBLIC_KEY_N", 1)]
    #[case("A=1\nB", 2)]
    #[case("=1", 1)]
    #[case("A B=1", 1)]
    fn rejects_malformed_lines(#[case] text: &str, #[case] line: usize) {
        assert_eq!(
            EnvFragment::parse(text),
            Err(Error::SanityCheckError(
                SanityCheckError::MalformedConfiguration { line }
            ))
        );
    }

    #[test]
    fn later_entries_replace_earlier_ones() {
        let mut fragment = EnvFragment::parse("A=1\nB=2\nA=3").unwrap();
        assert_eq!(fragment.get("A"), Some("3"));
        assert_eq!(fragment.keys().collect::<Vec<_>>(), vec!["A", "B"]);

        fragment.insert("B", "4");
        fragment.insert("C", "5");
        assert_eq!(fragment.render().as_str(), "A=3\nB=4\nC=5\n");
    }

    #[test]
    fn reads_keys_in_the_format_written_at_setup() {
        let public = format!("PUBLIC_KEY_N={}\nPUBLIC_KEY_G={}", to_hex(&N), {
            let n: PaillierModulusSizedNumber = N.resize();
            to_hex(&n.wrapping_add(&PaillierModulusSizedNumber::ONE))
        });
        let private = format!(
            "PRIVATE_KEY_LAMBDA={}\nPRIVATE_KEY_MU={}",
            to_hex(&LAMBDA),
            to_hex(&MU)
        );

        let public_key = PublicKey::from_env_fragment(&EnvFragment::parse(&public).unwrap()).unwrap();
        assert_eq!(public_key, crate::test_exports::public_key());

        let private_key =
            PrivateKey::from_env_fragment(public_key, &EnvFragment::parse(&private).unwrap())
                .unwrap();
        assert_eq!(private_key, crate::test_exports::private_key());
    }

    #[test]
    fn accepts_prefixed_public_variables() {
        let fragment = public_key().to_env_fragment().render();
        let prefixed = fragment
            .lines()
            .map(|line| format!("NEXT_PUBLIC_{line}"))
            .collect::<Vec<_>>()
            .join("\n");

        assert_eq!(
            PublicKey::from_env_fragment(&EnvFragment::parse(&prefixed).unwrap()).unwrap(),
            public_key()
        );
    }

    #[test]
    fn renders_and_reads_back_generated_keys() {
        let (public_key, private_key) = KeyPair::generate(256, &mut rand_core::OsRng)
            .unwrap()
            .into_parts();

        let public = public_key.to_env_fragment().render();
        let private = private_key.to_env_fragment().render();
        assert!(public.starts_with("PUBLIC_KEY_N="));
        assert!(private.starts_with("PRIVATE_KEY_LAMBDA="));
        assert!(!public.contains("0x"));

        let read_public = PublicKey::from_env_fragment(&EnvFragment::parse(&public).unwrap()).unwrap();
        let read_private =
            PrivateKey::from_env_fragment(read_public.clone(), &EnvFragment::parse(&private).unwrap())
                .unwrap();

        assert_eq!(read_public, public_key);
        assert_eq!(read_private, private_key);
    }

    #[test]
    fn refuses_private_keys_of_another_public_key() {
        let other = KeyPair::generate(256, &mut rand_core::OsRng).unwrap();

        assert_eq!(
            PrivateKey::from_env_fragment(
                other.public_key().clone(),
                &private_key().to_env_fragment()
            ),
            Err(Error::SanityCheckError(SanityCheckError::InvalidPrivateKey))
        );
    }

    #[test]
    fn reports_missing_public_values() {
        assert_eq!(
            PublicKey::from_env_fragment(&EnvFragment::parse("PUBLIC_KEY_N=abc").unwrap()),
            Err(Error::SanityCheckError(
                SanityCheckError::MissingConfiguration(PUBLIC_KEY_G.to_string())
            ))
        );
    }

    #[test]
    fn does_not_leak_values_through_debug() {
        let formatted = format!("{:?}", private_key().to_env_fragment());

        assert!(formatted.contains(PRIVATE_KEY_LAMBDA));
        assert!(!formatted.contains(&to_hex(&LAMBDA)));
    }
}
