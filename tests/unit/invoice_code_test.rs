// Invoice code generation: the `INV-{YY}{MM}-{6 alnum}` shape and the
// retry-until-unique loop around it.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, TimeZone, Utc};

use rentloop_billing::core::code::{generate_unique, invoice_code};
use rentloop_billing::AppError;

fn at(year: i32, month: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, 15, 12, 0, 0).unwrap()
}

#[test]
fn code_embeds_year_and_month() {
    assert!(invoice_code(at(2026, 1)).starts_with("INV-2601-"));
    assert!(invoice_code(at(2026, 12)).starts_with("INV-2612-"));
    assert!(invoice_code(at(2030, 7)).starts_with("INV-3007-"));
    // Century wraps to two digits
    assert!(invoice_code(at(2100, 3)).starts_with("INV-0003-"));
}

#[test]
fn suffix_is_six_uppercase_alphanumerics() {
    for _ in 0..100 {
        let code = invoice_code(at(2026, 6));
        let suffix = code.strip_prefix("INV-2606-").unwrap();
        assert_eq!(suffix.len(), 6);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}

#[test]
fn codes_rarely_collide() {
    // 36^6 possibilities; 1000 draws colliding would point at a broken RNG.
    let codes: HashSet<String> = (0..1000).map(|_| invoice_code(at(2026, 6))).collect();
    assert!(codes.len() > 990);
}

#[tokio::test]
async fn unique_code_returned_when_free() {
    let code = generate_unique(
        || invoice_code(at(2026, 6)),
        |_| async { Ok(false) },
        5,
    )
    .await
    .unwrap();
    assert!(code.starts_with("INV-2606-"));
}

#[tokio::test]
async fn collisions_are_retried_until_a_free_code() {
    let attempts = AtomicU32::new(0);
    let code = generate_unique(
        || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            format!("INV-2606-{:06}", n)
        },
        |candidate| async move { Ok(candidate != "INV-2606-000003") },
        5,
    )
    .await
    .unwrap();

    assert_eq!(code, "INV-2606-000003");
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn exhausted_attempts_surface_an_internal_error() {
    let result = generate_unique(|| invoice_code(at(2026, 6)), |_| async { Ok(true) }, 3).await;
    assert!(matches!(result, Err(AppError::Internal(_))));
}

#[tokio::test]
async fn uniqueness_check_errors_propagate() {
    let result = generate_unique(
        || invoice_code(at(2026, 6)),
        |_| async { Err(AppError::internal("probe failed")) },
        5,
    )
    .await;
    assert!(matches!(result, Err(AppError::Internal(_))));
}
