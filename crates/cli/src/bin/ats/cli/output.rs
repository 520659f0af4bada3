use anyhow::Result;
use ats_core::ActionOutcome;
use serde_json::{Value, json};

use crate::workflow::{AcceptReport, TermReport};

/// Print a plain-text representation of one term's results.
pub(crate) fn print_plain(report: &TermReport) {
	let status = if report.complete { "" } else { ", incomplete" };
	println!("{} ({} result(s){status})", report.term, report.total);
	for (rank, row) in report.rows.iter().enumerate() {
		let resolved = if row.resolved { " (resolved)" } else { "" };
		println!(
			"  {:>2}. {}  [{}{resolved}: {}]  {}",
			rank + 1,
			row.unique_title,
			row.field,
			row.highlighted(),
			row.collection
		);
	}
	if report.rows.len() < report.total {
		println!("  ... {} more", report.total - report.rows.len());
	}
	if let Some(accepted) = &report.accepted {
		for message in &accepted.messages {
			println!("  > {message}");
		}
	}
}

/// Format one term's results as a single-line JSON document.
pub(crate) fn format_report_json(report: &TermReport) -> Result<String> {
	let rows: Vec<Value> = report
		.rows
		.iter()
		.map(|row| {
			json!({
				"title": row.title,
				"unique_title": row.unique_title,
				"collection": row.collection,
				"entry": row.entry_id,
				"field": row.field,
				"value": row.value,
				"start": row.start,
				"length": row.length,
				"resolved": row.resolved,
			})
		})
		.collect();

	let payload = json!({
		"term": report.term,
		"total": report.total,
		"complete": report.complete,
		"results": rows,
		"accepted": report.accepted.as_ref().map(accept_json),
	});

	Ok(serde_json::to_string(&payload)?)
}

fn accept_json(accepted: &AcceptReport) -> Value {
	let (status, action, performed) = match accepted.outcome {
		ActionOutcome::Performed(action) => ("performed", action, Some(action)),
		ActionOutcome::FellBack { failed, performed } => ("fell-back", failed, Some(performed)),
		ActionOutcome::Failed(action) => ("failed", action, None),
	};
	json!({
		"status": status,
		"action": action,
		"performed": performed,
		"messages": accepted.messages,
	})
}

/// Print one term's results as a JSON line.
pub(crate) fn print_json(report: &TermReport) -> Result<()> {
	println!("{}", format_report_json(report)?);
	Ok(())
}

#[cfg(test)]
mod tests {
	use ats_core::Action;

	use super::*;
	use crate::workflow::ReportRow;

	fn report() -> TermReport {
		TermReport {
			term: "atlas".into(),
			total: 2,
			complete: true,
			rows: vec![ReportRow {
				title: "Atlas Corp".into(),
				unique_title: "Atlas Corp".into(),
				collection: "vault".into(),
				entry_id: "corp".into(),
				field: "Title".into(),
				value: "Atlas Corp".into(),
				start: 0,
				length: 5,
				resolved: false,
			}],
			accepted: Some(AcceptReport {
				outcome: ActionOutcome::FellBack {
					failed: Action::PerformAutoType,
					performed: Action::EditEntry,
				},
				messages: vec!["edit: would open 'Atlas Corp' in vault".into()],
			}),
		}
	}

	#[test]
	fn json_format_includes_rows_and_action() {
		let json = format_report_json(&report()).expect("json");
		let value: Value = serde_json::from_str(&json).expect("parse");
		assert_eq!(value["term"], "atlas");
		assert_eq!(value["results"][0]["entry"], "corp");
		assert_eq!(value["results"][0]["length"], 5);
		assert_eq!(value["accepted"]["status"], "fell-back");
		assert_eq!(value["accepted"]["action"], "auto-type");
		assert_eq!(value["accepted"]["performed"], "edit");
		assert!(!json.contains('\n'));
	}

	#[test]
	fn plain_output_prints_without_panic() {
		print_plain(&report());
	}
}
