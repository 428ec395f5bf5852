use super::*;

#[test]
fn history_records_in_order() {
    let navigator = HistoryNavigator::new();
    assert_eq!(navigator.current(), None);

    navigator.navigate(Route::Login);
    navigator.navigate(Route::ProviderDashboard);

    assert_eq!(navigator.history(), vec![Route::Login, Route::ProviderDashboard]);
    assert_eq!(navigator.current(), Some(Route::ProviderDashboard));
}

#[test]
fn usable_as_trait_object() {
    let navigator = std::sync::Arc::new(HistoryNavigator::new());
    let dynamic: std::sync::Arc<dyn Navigator> = navigator.clone();
    dynamic.navigate(Route::SeekerDashboard);
    assert_eq!(navigator.current(), Some(Route::SeekerDashboard));
}
