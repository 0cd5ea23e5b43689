use crate::app::{CheckRun, CheckStatus, CheckSuite, Conclusion};
use chrono::{DateTime, Utc};
use color_eyre::eyre::Result;

#[derive(serde::Deserialize)]
struct SuiteRef {
    id: u64,
}

#[derive(serde::Deserialize)]
struct ApiCheckRun {
    id: u64,
    name: String,
    status: CheckStatus,
    conclusion: Option<Conclusion>,
    #[serde(default)]
    check_suite: Option<SuiteRef>,
    #[serde(default)]
    html_url: Option<String>,
    #[serde(default)]
    details_url: Option<String>,
}

impl From<ApiCheckRun> for CheckRun {
    fn from(api: ApiCheckRun) -> Self {
        let workflow_run_id = api
            .html_url
            .as_deref()
            .and_then(workflow_run_id_from_url)
            .or_else(|| api.details_url.as_deref().and_then(workflow_run_id_from_url));
        CheckRun {
            id: api.id,
            name: api.name,
            check_suite_id: api.check_suite.map(|s| s.id),
            status: api.status,
            conclusion: api.conclusion,
            workflow_run_id,
        }
    }
}

#[derive(serde::Deserialize)]
struct ApiCheckSuite {
    id: u64,
    created_at: DateTime<Utc>,
    status: Option<CheckStatus>,
    #[serde(default)]
    rerequestable: Option<bool>,
}

/// Parses the output of `gh api --paginate … --jq '.check_runs[]'`: a stream
/// of whitespace-separated check run objects.
pub fn parse_check_runs(json: &str) -> Result<Vec<CheckRun>> {
    let stream = serde_json::Deserializer::from_str(json).into_iter::<ApiCheckRun>();
    let mut runs = Vec::new();
    for item in stream {
        runs.push(item?.into());
    }
    Ok(runs)
}

/// A missing `rerequestable` flag means the suite cannot be rerequested.
pub fn parse_check_suite(json: &str) -> Result<CheckSuite> {
    let api: ApiCheckSuite = serde_json::from_str(json)?;
    Ok(CheckSuite {
        id: api.id,
        created_at: api.created_at,
        status: api.status.unwrap_or(CheckStatus::Unknown),
        rerequestable: api.rerequestable.unwrap_or(false),
    })
}

/// Extracts `123` from `https://github.com/o/r/actions/runs/123/job/456`.
pub fn workflow_run_id_from_url(url: &str) -> Option<u64> {
    let (_, rest) = url.split_once("/actions/runs/")?;
    let digits = rest.split(['/', '?', '#']).next()?;
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RUN_STREAM: &str = r#"{"id":11,"name":"build","status":"completed","conclusion":"failure","check_suite":{"id":500},"html_url":"https://github.com/octo/repo/actions/runs/9001/job/11","details_url":"https://github.com/octo/repo/actions/runs/9001/job/11"}
{"id":12,"name":"lint","status":"in_progress","conclusion":null,"check_suite":{"id":501},"html_url":"https://github.com/octo/repo/runs/12","details_url":"https://ci.example.com/builds/77"}
"#;

    #[test]
    fn parse_stream_of_check_runs() {
        let runs = parse_check_runs(RUN_STREAM).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(
            runs[0],
            CheckRun {
                id: 11,
                name: "build".to_string(),
                check_suite_id: Some(500),
                status: CheckStatus::Completed,
                conclusion: Some(Conclusion::Failure),
                workflow_run_id: Some(9001),
            }
        );
        assert_eq!(runs[1].status, CheckStatus::InProgress);
        assert_eq!(runs[1].conclusion, None);
        assert_eq!(runs[1].workflow_run_id, None);
    }

    #[test]
    fn parse_empty_output_is_no_runs() {
        assert!(parse_check_runs("").unwrap().is_empty());
        assert!(parse_check_runs("\n").unwrap().is_empty());
    }

    #[test]
    fn parse_run_without_suite() {
        let json = r#"{"id":1,"name":"legacy","status":"completed","conclusion":"success"}"#;
        let runs = parse_check_runs(json).unwrap();
        assert_eq!(runs[0].check_suite_id, None);
        assert_eq!(runs[0].workflow_run_id, None);
    }

    #[test]
    fn parse_unknown_conclusion_and_status() {
        let json = r#"{"id":1,"name":"x","status":"brand_new","conclusion":"mystery"}"#;
        let runs = parse_check_runs(json).unwrap();
        assert_eq!(runs[0].status, CheckStatus::Unknown);
        assert_eq!(runs[0].conclusion, Some(Conclusion::Unknown));
    }

    #[test]
    fn parse_malformed_stream_errors() {
        assert!(parse_check_runs(r#"{"id":1,"name":"#).is_err());
    }

    #[test]
    fn parse_suite() {
        let json = r#"{
            "id": 500,
            "head_sha": "abc",
            "status": "completed",
            "conclusion": "failure",
            "created_at": "2024-06-01T10:00:00Z",
            "rerequestable": true
        }"#;
        let suite = parse_check_suite(json).unwrap();
        assert_eq!(suite.id, 500);
        assert_eq!(suite.status, CheckStatus::Completed);
        assert!(suite.rerequestable);
        assert_eq!(suite.created_at.to_rfc3339(), "2024-06-01T10:00:00+00:00");
    }

    #[test]
    fn parse_suite_without_flag_or_status() {
        let json = r#"{"id": 7, "status": null, "created_at": "2024-06-01T10:00:00Z"}"#;
        let suite = parse_check_suite(json).unwrap();
        assert_eq!(suite.status, CheckStatus::Unknown);
        assert!(!suite.rerequestable);
    }

    #[test]
    fn workflow_run_id_variants() {
        assert_eq!(
            workflow_run_id_from_url("https://github.com/o/r/actions/runs/42/job/7"),
            Some(42)
        );
        assert_eq!(
            workflow_run_id_from_url("https://github.com/o/r/actions/runs/42?check_suite_focus=true"),
            Some(42)
        );
        assert_eq!(workflow_run_id_from_url("https://github.com/o/r/actions/runs/42"), Some(42));
        assert_eq!(workflow_run_id_from_url("https://github.com/o/r/runs/42"), None);
        assert_eq!(workflow_run_id_from_url("https://github.com/o/r/actions/runs/abc"), None);
    }
}
