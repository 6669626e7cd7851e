use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

const MAX_TITLE_CHARS: usize = 500;
const MAX_FILES: usize = 100;
const MAX_DESCRIPTION_CHARS: usize = 10_000;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PrFile {
    pub filename: String,
    pub status: String,
    #[serde(default)]
    pub additions: u32,
    #[serde(default)]
    pub deletions: u32,
    #[serde(default)]
    pub changes: u32,
    #[serde(default)]
    pub patch: Option<String>,
}

impl PrFile {
    pub fn changed_lines(&self) -> u64 {
        u64::from(self.additions) + u64::from(self.deletions)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PrCommit {
    pub sha: String,
    pub message: String,
    pub author: String,
}

// wire shape, optional fields accept null
#[derive(Serialize, Deserialize, Debug)]
pub struct AnalyzeRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub files: Vec<PrFile>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub commits: Vec<PrCommit>,
    #[serde(default)]
    pub base_branch: Option<String>,
    #[serde(default)]
    pub head_branch: Option<String>,
    #[serde(default)]
    pub pr_url: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A validated pull request, ready to be analyzed.
#[derive(Debug, Clone)]
pub struct PullRequest {
    pub title: String,
    pub description: String,
    pub files: Vec<PrFile>,
    pub commits: Vec<PrCommit>,
    pub base_branch: String,
    pub head_branch: String,
    pub pr_url: String,
}

impl TryFrom<AnalyzeRequest> for PullRequest {
    type Error = String;

    fn try_from(request: AnalyzeRequest) -> Result<Self, Self::Error> {
        let title_chars = request.title.chars().count();
        if title_chars == 0 {
            return Err("title must not be empty".to_string());
        }
        if title_chars > MAX_TITLE_CHARS {
            return Err(format!("title must be at most {MAX_TITLE_CHARS} characters"));
        }
        if request.files.is_empty() {
            return Err("At least one file must be provided".to_string());
        }
        if request.files.len() > MAX_FILES {
            return Err(format!("Too many files. Maximum {MAX_FILES} files allowed."));
        }

        let description = request.description.unwrap_or_default();
        let description = if description.chars().count() > MAX_DESCRIPTION_CHARS {
            format!("{}... (truncated)", truncate_chars(&description, MAX_DESCRIPTION_CHARS))
        } else {
            description
        };

        Ok(PullRequest {
            title: request.title,
            description,
            files: request.files,
            commits: request.commits,
            base_branch: request.base_branch.unwrap_or_else(|| "main".to_string()),
            head_branch: request.head_branch.unwrap_or_default(),
            pr_url: request.pr_url.unwrap_or_default(),
        })
    }
}

impl PullRequest {
    // quick mode looks at the head of the change only
    pub fn quick(&self) -> PullRequest {
        PullRequest {
            files: self.files.iter().take(10).cloned().collect(),
            commits: self.commits.iter().take(5).cloned().collect(),
            ..self.clone()
        }
    }
}

pub fn truncate_chars(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((index, _)) => &value[..index],
        None => value,
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PrContext {
    pub summary: String,
    pub purpose: String,
    pub testing_focus: Vec<String>,
    pub potential_risks: Vec<String>,
    pub affected_areas: Vec<String>,
    pub review_priority: String,
    pub estimated_review_time: String,
    pub key_changes: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub context: Option<PrContext>,
    pub error: Option<String>,
    pub metadata: serde_json::Value,
}

impl AnalyzeResponse {
    pub fn success(context: PrContext, metadata: serde_json::Value) -> Self {
        AnalyzeResponse {
            success: true,
            context: Some(context),
            error: None,
            metadata,
        }
    }
}
