//! Public poll pages driven through the full middleware stack

mod common;

use common::{Site, create_choice, create_question};
use chrono::{Duration, Utc};
use polls_db::DatabaseError;
use polls_site::apps::polls::Question;
use polls_test::{ResponseExt, assert_queryset_equal};
use rstest::rstest;

fn question_list(site_response: &polls_test::TestResponse) -> Vec<Question> {
	serde_json::from_value(site_response.context_value("latest_question_list").clone())
		.expect("latest_question_list holds questions")
}

#[rstest]
#[tokio::test]
async fn test_index_without_questions() {
	// Arrange
	let site = Site::new().await;

	// Act
	let response = site.client.get("/polls/").await;

	// Assert
	response.assert_contains("No polls are available.");
	assert_queryset_equal(&question_list(&response), &[]);
}

#[rstest]
#[tokio::test]
async fn test_index_shows_past_question() {
	// Arrange
	let site = Site::new().await;
	let question = create_question(&site.conn, "Past question.", -30).await;

	// Act
	let response = site.client.get("/polls/").await;

	// Assert
	response.assert_contains("Past question.");
	assert_queryset_equal(&question_list(&response), &[question]);
}

#[rstest]
#[tokio::test]
async fn test_index_hides_future_question() {
	// Arrange
	let site = Site::new().await;
	create_question(&site.conn, "Future question.", 30).await;

	// Act
	let response = site.client.get("/polls/").await;

	// Assert
	response.assert_contains("No polls are available.");
	response.assert_not_contains("Future question.");
	assert_queryset_equal(&question_list(&response), &[]);
}

#[rstest]
#[tokio::test]
async fn test_index_with_future_and_past_question() {
	// Arrange
	let site = Site::new().await;
	let past = create_question(&site.conn, "Past question.", -30).await;
	create_question(&site.conn, "Future question.", 30).await;

	// Act
	let response = site.client.get("/polls/").await;

	// Assert
	assert_queryset_equal(&question_list(&response), &[past]);
}

#[rstest]
#[tokio::test]
async fn test_question_beyond_year_9999_is_refused() {
	// Arrange
	let site = Site::new().await;
	let past = create_question(&site.conn, "Past question.", -1).await;

	// Act
	let result = Question::create(
		&site.conn,
		"Far future.",
		Utc::now() + Duration::days(3_000_000),
	)
	.await;
	let index = site.client.get("/polls/").await;
	let detail = site.client.get(&format!("/polls/{}/", past.id + 1)).await;

	// Assert
	assert!(matches!(result, Err(DatabaseError::DateTimeOutOfRange(_))));
	index.assert_ok();
	index.assert_not_contains("Far future.");
	assert_queryset_equal(&question_list(&index), &[past]);
	detail.assert_not_found();
}

#[rstest]
#[tokio::test]
async fn test_index_orders_newest_first() {
	// Arrange
	let site = Site::new().await;
	let older = create_question(&site.conn, "Past question 1.", -30).await;
	let newer = create_question(&site.conn, "Past question 2.", -10).await;

	// Act
	let response = site.client.get("/polls/").await;

	// Assert
	assert_queryset_equal(&question_list(&response), &[newer, older]);
}

#[rstest]
#[tokio::test]
async fn test_index_shows_at_most_five() {
	// Arrange
	let site = Site::new().await;
	for days in 1..=7 {
		create_question(&site.conn, &format!("Question {}", days), -days).await;
	}

	// Act
	let response = site.client.get("/polls/").await;

	// Assert
	let texts: Vec<String> = question_list(&response)
		.into_iter()
		.map(|question| question.question_text)
		.collect();
	assert_eq!(
		texts,
		["Question 1", "Question 2", "Question 3", "Question 4", "Question 5"]
	);
}

#[rstest]
#[tokio::test]
async fn test_detail_of_future_question_is_not_found() {
	// Arrange
	let site = Site::new().await;
	let future = create_question(&site.conn, "Future question.", 5).await;

	// Act
	let response = site.client.get(&format!("/polls/{}/", future.id)).await;

	// Assert
	response.assert_not_found();
	response.assert_not_contains("Future question.");
}

#[rstest]
#[tokio::test]
async fn test_detail_of_past_question() {
	// Arrange
	let site = Site::new().await;
	let past = create_question(&site.conn, "Past Question.", -5).await;
	create_choice(&site.conn, &past, "Not much").await;

	// Act
	let response = site.client.get(&format!("/polls/{}/", past.id)).await;

	// Assert
	response.assert_contains("Past Question.");
	response.assert_contains("Not much");
	assert_eq!(response.context_value("question")["id"], past.id);
}

#[rstest]
#[tokio::test]
async fn test_detail_shows_question_text_with_slashes() {
	// Arrange
	let site = Site::new().await;
	let past = create_question(&site.conn, "Yes/No or either/or?", -5).await;

	// Act
	let response = site.client.get(&format!("/polls/{}/", past.id)).await;

	// Assert
	response.assert_contains("Yes/No or either/or?");
	response.assert_not_contains("&#x2F;");
}

#[rstest]
#[case::unknown_id("/polls/999/")]
#[case::not_an_integer("/polls/abc/")]
#[case::unknown_path("/nothing/here/")]
#[tokio::test]
async fn test_not_found_pages(#[case] path: &str) {
	// Arrange
	let site = Site::new().await;

	// Act
	let response = site.client.get(path).await;

	// Assert
	response.assert_not_found();
	assert!(response.text().contains("Page not found"));
}

#[rstest]
#[case("/polls/34/results/", "You are looking as the results of question 34.")]
#[case("/polls/34/vote/", "You are voting on question 34.")]
#[tokio::test]
async fn test_stub_pages_echo_id(#[case] path: &str, #[case] expected: &str) {
	// Arrange
	let site = Site::new().await;

	// Act
	let response = site.client.get(path).await;

	// Assert
	response.assert_ok();
	assert_eq!(response.text(), expected);
	assert_eq!(response.content_type(), Some("text/plain; charset=utf-8"));
}

#[rstest]
#[tokio::test]
async fn test_vote_accepts_post() {
	// Arrange
	let site = Site::new().await;

	// Act
	let response = site.client.post_form("/polls/3/vote/", &[("choice", "1")]).await;

	// Assert
	response.assert_contains("You are voting on question 3.");
}

#[rstest]
#[tokio::test]
async fn test_wrong_method_is_rejected() {
	// Arrange
	let site = Site::new().await;

	// Act
	let response = site.client.delete("/polls/").await;

	// Assert
	response.assert_method_not_allowed();
}

#[rstest]
#[tokio::test]
async fn test_missing_slash_redirects() {
	// Arrange
	let site = Site::new().await;

	// Act
	let response = site.client.get("/polls").await;

	// Assert
	response.assert_redirects("/polls/");
}
