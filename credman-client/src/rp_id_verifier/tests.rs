use url::Url;

use super::*;

fn origin(url: &str) -> Url {
    Url::parse(url).expect("a valid url")
}

#[test]
fn effective_domain_is_the_default_rp_id() {
    let verifier = RpIdVerifier::new();
    let rp_id = verifier
        .assert_domain(&origin("https://www.acme.example"), None)
        .unwrap();

    assert_eq!(rp_id, "www.acme.example");
}

#[test]
fn rp_id_may_be_a_label_suffix_of_the_origin() {
    let verifier = RpIdVerifier::new();
    let rp_id = verifier
        .assert_domain(&origin("https://login.acme.example"), Some("acme.example"))
        .unwrap();

    assert_eq!(rp_id, "acme.example");
}

#[test]
fn rp_id_must_end_on_a_label_boundary() {
    let verifier = RpIdVerifier::new();
    let result = verifier.assert_domain(&origin("https://notacme.example"), Some("acme.example"));

    assert_eq!(result, Err(SecurityError::OriginRpMismatch));
}

#[test]
fn rp_id_cannot_be_a_sibling_or_child() {
    let verifier = RpIdVerifier::new();
    let origin = origin("https://acme.example");

    assert_eq!(
        verifier.assert_domain(&origin, Some("evil.example")),
        Err(SecurityError::OriginRpMismatch)
    );
    assert_eq!(
        verifier.assert_domain(&origin, Some("login.acme.example")),
        Err(SecurityError::OriginRpMismatch)
    );
}

#[test]
fn single_label_rp_id_is_invalid() {
    let verifier = RpIdVerifier::new();
    let result = verifier.assert_domain(&origin("https://acme.example"), Some("example"));

    assert_eq!(result, Err(SecurityError::InvalidRpId));
}

#[test]
fn public_suffix_rp_id_is_invalid() {
    let verifier = RpIdVerifier::new();

    assert_eq!(
        verifier.assert_domain(&origin("https://acme.co.uk"), Some("co.uk")),
        Err(SecurityError::InvalidRpId)
    );
    assert_eq!(
        verifier.assert_domain(&origin("https://alice.github.io"), Some("github.io")),
        Err(SecurityError::InvalidRpId)
    );
}

#[test]
fn registrable_domain_under_a_public_suffix_is_valid() {
    let verifier = RpIdVerifier::new();

    assert_eq!(
        verifier
            .assert_domain(&origin("https://login.acme.co.uk"), Some("acme.co.uk"))
            .as_deref(),
        Ok("acme.co.uk")
    );
    assert_eq!(
        verifier
            .assert_domain(&origin("https://alice.github.io"), None)
            .as_deref(),
        Ok("alice.github.io")
    );
}

#[test]
fn http_origin_is_rejected() {
    let verifier = RpIdVerifier::new();
    let result = verifier.assert_domain(&origin("http://acme.example"), None);

    assert_eq!(result, Err(SecurityError::UnprotectedOrigin));
}

#[test]
fn localhost_needs_opt_in() {
    let origin = origin("http://localhost:8080");

    assert_eq!(
        RpIdVerifier::new().assert_domain(&origin, None),
        Err(SecurityError::InsecureLocalhostNotAllowed)
    );
    assert_eq!(
        RpIdVerifier::new()
            .allows_insecure_localhost(true)
            .assert_domain(&origin, Some("localhost"))
            .as_deref(),
        Ok("localhost")
    );
}

#[test]
fn ip_origins_have_no_domain() {
    let verifier = RpIdVerifier::new();
    let result = verifier.assert_domain(&origin("https://127.0.0.1"), None);

    assert_eq!(result, Err(SecurityError::OriginMissingDomain));
}

#[test]
fn unicode_rp_id_matches_punycode_origin() {
    let verifier = RpIdVerifier::new();
    let rp_id = verifier
        .assert_domain(&origin("https://login.bücher.example"), Some("Bücher.example"))
        .unwrap();

    assert_eq!(rp_id, "xn--bcher-kva.example");
}
