use public_suffix::{EffectiveTLDProvider, PublicSuffixList, DEFAULT_PROVIDER};
use url::Url;

use crate::SecurityError;

#[cfg(test)]
mod tests;

/// Verifies that a given RP ID is within the scope of the request's origin.
///
/// While most cases should not use this type directly and instead use
/// [`CredentialsContainer`](crate::CredentialsContainer), a relying party server can use it to
/// check an RP ID the same way the container does.
///
/// An RP ID must be the origin's effective domain or a suffix of it on a label boundary, and
/// must have an eTLD+1 according to the TLD provider `P`, so a public suffix is never an RP ID.
pub struct RpIdVerifier<P = PublicSuffixList> {
    tld_provider: P,
    allows_insecure_localhost: bool,
}

impl RpIdVerifier {
    /// A verifier backed by [`public_suffix::DEFAULT_PROVIDER`], rejecting `localhost`.
    pub fn new() -> Self {
        Self::with_tld_provider(DEFAULT_PROVIDER)
    }
}

impl Default for RpIdVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> RpIdVerifier<P>
where
    P: EffectiveTLDProvider,
{
    /// A verifier deciding registrable domains with a custom public suffix list.
    pub fn with_tld_provider(tld_provider: P) -> Self {
        Self {
            tld_provider,
            allows_insecure_localhost: false,
        }
    }

    /// Allows [`RpIdVerifier::assert_domain`] to pass through requests from `localhost`.
    pub fn allows_insecure_localhost(mut self, is_allowed: bool) -> Self {
        self.allows_insecure_localhost = is_allowed;
        self
    }

    /// Parse the given RP ID and verify it against the origin of the request.
    ///
    /// Returns the RP ID to scope credentials to, in its ASCII form: `rp_id` when given, the
    /// origin's effective domain otherwise.
    ///
    /// <https://html.spec.whatwg.org/multipage/browsers.html#is-a-registrable-domain-suffix-of-or-is-equal-to>
    pub fn assert_domain(
        &self,
        origin: &Url,
        rp_id: Option<&str>,
    ) -> Result<String, SecurityError> {
        let effective_domain = origin
            .domain()
            .ok_or(SecurityError::OriginMissingDomain)?
            .to_ascii_lowercase();

        let rp_id = match rp_id {
            Some(rp_id) => {
                let rp_id = normalize(rp_id).ok_or(SecurityError::InvalidRpId)?;
                if !is_label_suffix(&effective_domain, &rp_id) {
                    return Err(SecurityError::OriginRpMismatch);
                }
                rp_id
            }
            None => effective_domain,
        };

        // guard against localhost effective domain, return early
        if rp_id == "localhost" {
            return if self.allows_insecure_localhost {
                Ok(rp_id)
            } else {
                Err(SecurityError::InsecureLocalhostNotAllowed)
            };
        }

        if !origin.scheme().eq_ignore_ascii_case("https") {
            return Err(SecurityError::UnprotectedOrigin);
        }

        if !self.is_registrable(&rp_id) {
            log::debug!("rejecting RP ID {rp_id}, it is a public suffix");
            return Err(SecurityError::InvalidRpId);
        }

        Ok(rp_id)
    }

    /// Whether credentials may be scoped to `rp_id`, an ASCII domain. `co.uk` and `github.io`
    /// may not.
    pub fn is_registrable(&self, rp_id: &str) -> bool {
        self.tld_provider.effective_tld_plus_one(rp_id).is_ok()
    }
}

impl<P> std::fmt::Debug for RpIdVerifier<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpIdVerifier")
            .field("allows_insecure_localhost", &self.allows_insecure_localhost)
            .finish_non_exhaustive()
    }
}

/// The lowercase ASCII (punycode) form of a domain, `None` when it is not a valid domain.
fn normalize(domain: &str) -> Option<String> {
    let ascii = idna::domain_to_ascii(domain).ok()?;
    let valid = !ascii.is_empty()
        && ascii
            .split('.')
            .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'));
    valid.then_some(ascii)
}

fn is_label_suffix(domain: &str, suffix: &str) -> bool {
    domain == suffix
        || domain
            .strip_suffix(suffix)
            .is_some_and(|head| head.ends_with('.'))
}
