use crate::helpers::{spawn_app_with_configuration, test_configuration};

#[tokio::test]
async fn health_check_works() {
    // Arrange
    let test_app = spawn_app_with_configuration(test_configuration()).await;

    // Act
    let response = test_app.get("/health_check").await;

    // Assert
    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length());
}
