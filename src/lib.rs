pub use ox_forms;
pub use ox_submissions;

pub use ox_forms::{FormDefinition, FormEngine, FormError, ModuleSchema, TypeRegistry};
pub use ox_submissions::{
    judge_review_form, project_submission_form, project_submission_schema, DocumentStore,
    IdentityProvider, InMemoryStore, JudgeReviewHandler, ProjectSubmitHandler, SubmissionError,
};
