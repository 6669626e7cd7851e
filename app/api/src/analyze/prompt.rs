use super::model::PullRequest;
use super::model::truncate_chars;

const MAX_LISTED_FILES: usize = 30;
const MAX_LISTED_COMMITS: usize = 15;
const MAX_COMMIT_MESSAGE_CHARS: usize = 150;
const MAX_DESCRIPTION_CHARS: usize = 1500;
const LARGE_CHANGE_LINES: u64 = 500;

// the extension sends placeholder rows when only the conversation tab is visible
const SUMMARY_ROW_PREFIXES: [&str; 4] = ["[", "SUMMARY", "LIMITATION", "ℹ️"];

#[derive(Debug, PartialEq)]
pub struct FileStats {
    pub listed: Vec<String>,
    pub total_additions: u64,
    pub total_deletions: u64,
    pub file_types: Vec<(String, usize)>,
    pub large_changes: Vec<String>,
    pub has_individual_files: bool,
}

impl FileStats {
    pub fn collect(pr: &PullRequest) -> Self {
        let mut listed = vec![];
        let mut total_additions = 0;
        let mut total_deletions = 0;
        let mut file_types: Vec<(String, usize)> = vec![];
        let mut large_changes = vec![];

        for (i, file) in pr.files.iter().take(MAX_LISTED_FILES).enumerate() {
            listed.push(format!(
                "  {}. {} ({}): +{}/-{}",
                i + 1,
                file.filename,
                file.status,
                file.additions,
                file.deletions
            ));
            total_additions += u64::from(file.additions);
            total_deletions += u64::from(file.deletions);

            let extension = file.filename.rsplit_once('.').map_or("unknown", |(_, extension)| extension);
            match file_types.iter_mut().find(|(name, _)| name == extension) {
                Some((_, count)) => *count += 1,
                None => file_types.push((extension.to_string(), 1)),
            }

            if file.changed_lines() > LARGE_CHANGE_LINES {
                large_changes.push(format!("{} ({} lines)", file.filename, file.changed_lines()));
            }
        }
        if pr.files.len() > MAX_LISTED_FILES {
            listed.push(format!("  ... and {} more files", pr.files.len() - MAX_LISTED_FILES));
        }

        // stable sort keeps first-seen order between equal counts
        file_types.sort_by(|a, b| b.1.cmp(&a.1));
        file_types.truncate(5);

        let has_individual_files = pr
            .files
            .iter()
            .take(5)
            .any(|file| !SUMMARY_ROW_PREFIXES.iter().any(|prefix| file.filename.starts_with(prefix)));

        FileStats {
            listed,
            total_additions,
            total_deletions,
            file_types,
            large_changes,
            has_individual_files,
        }
    }

    pub fn total_lines(&self) -> u64 {
        self.total_additions + self.total_deletions
    }
}

fn commit_lines(pr: &PullRequest) -> Vec<String> {
    let mut lines: Vec<String> = pr
        .commits
        .iter()
        .take(MAX_LISTED_COMMITS)
        .enumerate()
        .map(|(i, commit)| format!("  {}. {}", i + 1, truncate_chars(&commit.message, MAX_COMMIT_MESSAGE_CHARS)))
        .collect();
    if pr.commits.len() > MAX_LISTED_COMMITS {
        lines.push(format!("  ... and {} more commits", pr.commits.len() - MAX_LISTED_COMMITS));
    }
    lines
}

fn statistics_section(pr: &PullRequest, stats: &FileStats) -> String {
    let mut lines = vec![
        "CODE CHANGE STATISTICS:".to_string(),
        format!("- Total Files: {} files", pr.files.len()),
        format!("- Total Additions: +{} lines", stats.total_additions),
        format!("- Total Deletions: -{} lines", stats.total_deletions),
        format!("- Net Change Volume: {} lines modified", stats.total_lines()),
    ];

    if stats.has_individual_files {
        let types: Vec<String> = stats
            .file_types
            .iter()
            .map(|(extension, count)| format!("{extension}({count})"))
            .collect();
        lines.push(format!("- File Types: {}", types.join(", ")));
        if !stats.large_changes.is_empty() {
            let large: Vec<&str> = stats.large_changes.iter().take(3).map(String::as_str).collect();
            lines.push(format!("- Large Changes (>{LARGE_CHANGE_LINES} lines): {}", large.join(", ")));
        }
    } else {
        lines.push(
            "- DATA LIMITATION: only summary statistics are available, the reviewer is on the Conversation tab"
                .to_string(),
        );
        lines.push("- Individual file names and per-file breakdowns are not available".to_string());
    }
    lines.join("\n")
}

pub fn build_analysis_prompt(pr: &PullRequest) -> String {
    let stats = FileStats::collect(pr);
    let commits = commit_lines(pr);
    let total_lines = stats.total_lines();
    let file_count = pr.files.len();

    let description = if pr.description.is_empty() {
        "No description provided"
    } else {
        truncate_chars(&pr.description, MAX_DESCRIPTION_CHARS)
    };
    let commit_list = if commits.is_empty() {
        "No commits information".to_string()
    } else {
        commits.join("\n")
    };
    let data_context = if stats.has_individual_files {
        "Individual file names ARE available. Cite specific files from the list above."
    } else {
        "ONLY SUMMARY DATA IS AVAILABLE. You have the total file count and additions/deletions but NOT the file \
         names. Infer what changed from the PR title, description and total change volume."
    };
    let summary_hint = if stats.has_individual_files {
        "Mention specific files from the FILES CHANGED list."
    } else {
        "File names are unavailable, infer the changes from the PR title and description."
    };

    format!(
        r#"You are a senior staff engineer performing an expert code review that will guide engineering decisions. Your analysis must be specific to this pull request, professional and actionable. Do not give generic advice.

=== PULL REQUEST ===
Title: {title}
Description: {description}
Base Branch: {base_branch}
Head Branch: {head_branch}

{statistics}

FILES CHANGED ({file_count} files):
{files}

COMMITS ({commit_count} commits):
{commit_list}

=== REQUIREMENTS ===
Every point must be:
- SPECIFIC to this PR: cite actual files when available, otherwise infer from title and description
- INSIGHTFUL: architectural reasoning, not obvious observations
- ACTIONABLE: concrete steps, not "test thoroughly"

Never write generic advice ("ensure proper testing"), obvious statements ("files were modified"), vague warnings ("could have issues"), or claim "0 lines" changed when the statistics show otherwise.

DATA CONTEXT: {data_context}

Respond with a JSON object of exactly this shape:
{{
  "summary": "2-3 sentences citing the actual numbers ({additions} additions, {deletions} deletions across {file_count} files). {summary_hint}",
  "purpose": "The technical problem being solved, citing issue numbers from the description when present",
  "testing_focus": ["3 or more concrete test scenarios derived from the changes, including an edge case and a regression check"],
  "potential_risks": ["2 or more specific technical risks introduced by this PR"],
  "affected_areas": ["modules, files, APIs or storage touched, each with its role"],
  "review_priority": "LOW/MEDIUM/HIGH/CRITICAL with a justification referencing {total_lines} changed lines across {file_count} files",
  "estimated_review_time": "Realistic minutes for {total_lines} changed lines: <200 lines: 10-20min | 200-500: 20-40min | 500-1000: 40-70min | >1000: 70-120min, adjusted for complexity",
  "key_changes": ["4 to 7 specific changes, each naming the file or component and its impact"]
}}

Rules:
1. Use the actual numbers: {additions} additions, {deletions} deletions, {total_lines} total lines.
2. Use the title and description to infer what changed.
3. Be specific or leave it out.

Return ONLY the JSON object. No markdown, no code fences, no extra text."#,
        title = pr.title,
        description = description,
        base_branch = pr.base_branch,
        head_branch = pr.head_branch,
        statistics = statistics_section(pr, &stats),
        file_count = file_count,
        files = stats.listed.join("\n"),
        commit_count = pr.commits.len(),
        commit_list = commit_list,
        data_context = data_context,
        additions = stats.total_additions,
        deletions = stats.total_deletions,
        summary_hint = summary_hint,
        total_lines = total_lines,
    )
}
