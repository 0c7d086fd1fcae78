//! `caselink attach`: dedup and persist comments or alert references on a case.

use crate::author;
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};
use anyhow::Context;
use caselink_core::config::EffectiveConfig;
use caselink_core::db;
use caselink_core::model::attachment::derive_attachment_id;
use caselink_core::model::{AttachmentBody, AttachmentRequest, NewAttachment, PersistableAttachment};
use caselink_core::{BulkCreateOutcome, CaseAttachments, CreateOutcome, ErrorCode, WriteContext};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Args, Debug)]
pub struct AttachArgs {
    /// Case to attach to.
    pub case_id: String,

    /// JSON request file; `-` reads stdin.
    #[arg(long, short, default_value = "-")]
    pub file: PathBuf,
}

/// One request as read from input; `id` is derived when absent.
#[derive(Debug, Deserialize)]
struct RequestInput {
    #[serde(default)]
    id: Option<String>,
    #[serde(flatten)]
    request: AttachmentRequest,
}

/// Parsed input: a bare object is a single create, an array a bulk create.
#[derive(Debug)]
enum Input {
    Single(NewAttachment),
    Bulk(Vec<NewAttachment>),
}

#[derive(Debug, Serialize)]
struct AttachOutput {
    ok: bool,
    case_id: String,
    persisted: bool,
    attachments: Vec<PersistableAttachment>,
}

fn read_input(file: &Path) -> anyhow::Result<String> {
    if file.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("read request from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(file).with_context(|| format!("read {}", file.display()))
}

fn to_new_attachment(
    value: serde_json::Value,
    case_id: &str,
    created_at: DateTime<Utc>,
    position: usize,
) -> Result<NewAttachment, serde_json::Error> {
    let payload = value.to_string();
    let input: RequestInput = serde_json::from_value(value)?;
    let id = input
        .id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| derive_attachment_id(case_id, created_at, position, &payload));
    Ok(NewAttachment::new(id, input.request))
}

fn parse_input(
    raw: &str,
    case_id: &str,
    created_at: DateTime<Utc>,
) -> Result<Input, serde_json::Error> {
    match serde_json::from_str::<serde_json::Value>(raw)? {
        serde_json::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(pos, value)| to_new_attachment(value, case_id, created_at, pos))
            .collect::<Result<Vec<_>, _>>()
            .map(Input::Bulk),
        value => to_new_attachment(value, case_id, created_at, 0).map(Input::Single),
    }
}

fn describe(record: &PersistableAttachment) -> String {
    match &record.attributes.body {
        AttachmentBody::User { comment } => format!("comment \"{comment}\""),
        AttachmentBody::Alert { alert_id, rule, .. } => {
            format!("alerts {} (rule {})", alert_id.join(","), rule.name)
        }
    }
}

fn render_attach_text(out: &AttachOutput, w: &mut dyn Write) -> io::Result<()> {
    if out.attachments.is_empty() {
        return writeln!(w, "nothing attached to {}", out.case_id);
    }
    for record in &out.attachments {
        writeln!(w, "{} {} {}", record.id, record.kind(), describe(record))?;
    }
    Ok(())
}

fn render_attach_pretty(out: &AttachOutput, w: &mut dyn Write) -> io::Result<()> {
    if out.attachments.is_empty() {
        return writeln!(w, "✓ nothing attached to {}: all alerts already present", out.case_id);
    }
    pretty_section(w, &format!("Attached to {}", out.case_id))?;
    for record in &out.attachments {
        pretty_kv(w, record.kind().as_str(), format!("{}  {}", record.id, describe(record)))?;
    }
    Ok(())
}

pub fn run_attach(
    args: &AttachArgs,
    user_flag: Option<&str>,
    output: OutputMode,
    config: &EffectiveConfig,
) -> anyhow::Result<()> {
    let created_by = match author::require_author(user_flag, &config.author()) {
        Ok(profile) => profile,
        Err(err) => {
            render_error(
                output,
                &CliError::with_details(
                    err.message.clone(),
                    "Pass --user NAME, set CASELINK_USER, or add [author] username to config.",
                    ErrorCode::InvalidInput.code(),
                ),
            )?;
            anyhow::bail!("{err}");
        }
    };
    let ctx = WriteContext::now(created_by);

    let raw = read_input(&args.file)?;
    let input = match parse_input(&raw, &args.case_id, ctx.created_at) {
        Ok(input) => input,
        Err(err) => {
            let msg = format!("invalid request body: {err}");
            render_error(output, &CliError::from_code(msg.clone(), ErrorCode::InvalidInput))?;
            anyhow::bail!(msg);
        }
    };

    let store = db::open_store(&config.store_path)?;
    let cases = CaseAttachments::new(args.case_id.as_str(), &store, &store);

    let result = match input {
        Input::Single(item) => {
            debug!(attachment_id = %item.id, owner = item.request.owner(), "single attach");
            cases.create(&item, &ctx).map(|outcome| match outcome {
                CreateOutcome::Created(record) => BulkCreateOutcome {
                    attachments: vec![record],
                    persisted: true,
                },
                CreateOutcome::NotCreated => BulkCreateOutcome::default(),
            })
        }
        Input::Bulk(items) => {
            debug!(items = items.len(), "bulk attach");
            cases.bulk_create(&items, &ctx)
        }
    };

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            anyhow::bail!("{err}");
        }
    };

    let out = AttachOutput {
        ok: true,
        case_id: args.case_id.clone(),
        persisted: outcome.persisted,
        attachments: outcome.attachments,
    };
    render_mode(output, &out, render_attach_text, render_attach_pretty)
}
