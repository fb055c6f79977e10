//! Grading server API endpoints

use crate::ServerClient;
use crate::error::Result;
use gradebook_core::dto::grade::{GradeRosterRequest, GradeRosterResponse};
use gradebook_core::dto::question::{GenerateQuestion, GeneratedQuestion};
use gradebook_core::dto::repo::{CheckRepo, RepoStatus};

impl ServerClient {
    /// Grade a whole roster against a reference solution
    ///
    /// The call returns once every entry has been graded. Per-entry failures
    /// show up in the entries' feedback, never as an error here.
    ///
    /// # Example
    /// ```no_run
    /// # use gradebook_client::ServerClient;
    /// # use gradebook_core::domain::roster::RosterEntry;
    /// # use gradebook_core::dto::grade::GradeRosterRequest;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = ServerClient::new("http://localhost:5000");
    /// let result = client.grade_roster(GradeRosterRequest {
    ///     reference_solution: "print('hi')".to_string(),
    ///     roster: vec![RosterEntry::new("https://github.com/ada/lovelace")],
    ///     problem_statement: "Print a greeting.".to_string(),
    /// }).await?;
    /// assert_eq!(result.entries.len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn grade_roster(&self, req: GradeRosterRequest) -> Result<GradeRosterResponse> {
        let url = format!("{}/api/grade-students", self.base_url);
        let response = self.client.post(&url).json(&req).send().await?;

        self.handle_response(response).await
    }

    /// Ask the server to derive a problem statement from a source file
    pub async fn generate_question(&self, req: GenerateQuestion) -> Result<GeneratedQuestion> {
        let url = format!("{}/api/generate-question", self.base_url);
        let response = self.client.post(&url).json(&req).send().await?;

        self.handle_response(response).await
    }

    /// Check whether a repository is visible on the code host
    pub async fn check_repo(&self, req: CheckRepo) -> Result<RepoStatus> {
        let url = format!("{}/api/check-repo", self.base_url);
        let response = self.client.post(&url).json(&req).send().await?;

        self.handle_response(response).await
    }
}
