use brgy_kernel::security::resource::ResourceGuard;

#[test]
fn resource_guard_returns_bare_ids() {
    assert_eq!(ResourceGuard::verify("emergencies:Xy7_k-9", "emergencies").unwrap(), "Xy7_k-9");
    assert_eq!(ResourceGuard::verify(" Xy7 ", "emergencies").unwrap(), "Xy7");
}

#[test]
fn resource_guard_rejects_foreign_and_malformed_ids() {
    assert!(ResourceGuard::verify("admin_users:123", "reports").is_err());
    assert!(ResourceGuard::verify("", "reports").is_err());
    assert!(ResourceGuard::verify("reports:", "reports").is_err());
    assert!(ResourceGuard::verify("1; DELETE reports", "reports").is_err());
}
