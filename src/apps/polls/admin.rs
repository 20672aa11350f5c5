//! Admin registration for the polls app

use polls_admin::{AdminResult, AdminSite, Fieldset, ModelAdminConfig, TabularInline};

use super::models::{Choice, Question};

/// Question admin: grouped fields, choices edited inline, searchable and
/// filterable by publication date
pub fn question_admin() -> ModelAdminConfig<Question> {
	ModelAdminConfig::new()
		.with_fieldsets(vec![
			Fieldset::unnamed(["question_text"]),
			Fieldset::named("Date Information", ["pub_date"]),
		])
		.with_inline(TabularInline::<Choice>::new().with_extra(3))
		.with_list_display(&["question_text", "pub_date", "was_published_recently"])
		.with_boolean_column(
			"was_published_recently",
			"Published recently?",
			Question::was_published_recently,
		)
		.with_list_filter(&["pub_date"])
		.with_search_fields(&["question_text"])
}

pub fn register(site: &mut AdminSite) -> AdminResult<()> {
	site.register(question_admin())?;
	site.register(ModelAdminConfig::<Choice>::new())?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use polls_admin::{InlineType, ModelAdmin};
	use rstest::rstest;

	#[rstest]
	fn test_question_admin_layout() {
		// Act
		let admin = question_admin();

		// Assert
		let fieldsets = admin.fieldsets();
		assert_eq!(fieldsets.len(), 2);
		assert_eq!(fieldsets[0].name, None);
		assert_eq!(fieldsets[0].fields, vec!["question_text"]);
		assert_eq!(fieldsets[1].name.as_deref(), Some("Date Information"));
		assert_eq!(fieldsets[1].fields, vec!["pub_date"]);
		assert!(admin.is_boolean_column("was_published_recently"));

		let inlines = admin.inlines();
		assert_eq!(inlines.len(), 1);
		assert_eq!(inlines[0].inline_type(), InlineType::Tabular);
		assert_eq!(inlines[0].extra(), 3);
	}

	#[rstest]
	fn test_register_both_models() {
		// Arrange
		let mut site = AdminSite::new("Polls administration");

		// Act
		register(&mut site).unwrap();

		// Assert
		assert!(site.is_registered::<Question>());
		assert!(site.is_registered::<Choice>());
		assert!(register(&mut site).is_err());
	}
}
