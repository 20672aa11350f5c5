//! Public poll pages

use chrono::Utc;
use polls_db::{DatabaseConnection, FilterOperator, Model};
use polls_http::{Request, Response, Result};
use polls_shortcuts::{get_object_or_404, render, render_text};
use serde_json::json;

use super::models::{Choice, Question};

const LATEST_COUNT: i64 = 5;

/// `GET /polls/`: the five most recently published questions
///
/// Questions dated in the future are not published yet and are left out.
pub async fn index(request: Request) -> Result<Response> {
	let conn = request.extension::<DatabaseConnection>()?;
	let latest_question_list = Question::objects()
		.filter("pub_date", FilterOperator::Lte, Utc::now())
		.order_by("-pub_date")
		.limit(LATEST_COUNT)
		.all(&conn)
		.await?;

	render(
		&request,
		"polls/index.html",
		json!({ "latest_question_list": latest_question_list }),
	)
}

/// `GET /polls/{question_id}/`, 404 for unknown or unpublished questions
pub async fn detail(request: Request) -> Result<Response> {
	let conn = request.extension::<DatabaseConnection>()?;
	let question_id: i64 = request.path_param("question_id")?;
	let question = get_object_or_404(
		&conn,
		Question::objects()
			.filter("id", FilterOperator::Eq, question_id)
			.filter("pub_date", FilterOperator::Lte, Utc::now()),
	)
	.await?;
	let choices = Choice::objects()
		.filter("question_id", FilterOperator::Eq, question.id)
		.order_by("id")
		.all(&conn)
		.await?;

	render(
		&request,
		"polls/detail.html",
		json!({ "question": question, "choices": choices }),
	)
}

pub async fn results(request: Request) -> Result<Response> {
	let question_id: i64 = request.path_param("question_id")?;
	Ok(render_text(format!(
		"You are looking as the results of question {}.",
		question_id
	)))
}

pub async fn vote(request: Request) -> Result<Response> {
	let question_id: i64 = request.path_param("question_id")?;
	Ok(render_text(format!("You are voting on question {}.", question_id)))
}
