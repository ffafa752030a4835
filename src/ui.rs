use crate::models::{Identity, Mood, MoodEntry};
use crate::stats::MoodStats;
use crate::view_model::{SessionState, ViewState};
use chrono::{DateTime, Local, Utc};

pub fn render_index(state: &ViewState) -> String {
    let body = match &state.session {
        SessionState::Resolving => r#"<p class="muted">Loading...</p>"#.to_string(),
        SessionState::Unauthenticated => render_sign_in(state.signing_in),
        SessionState::Authenticated(identity) => [
            render_mood_form(state, identity),
            render_stats_card(state.stats.as_ref()),
            render_insights(&state.insights.iter().map(|i| i.message()).collect::<Vec<_>>()),
            render_entry_list(state),
        ]
        .concat(),
    };

    let overlays = [
        render_notice(state.notice.as_deref()),
        render_confirm(state.pending_delete.as_deref()),
    ]
    .concat();

    INDEX_HTML
        .replace("{{HEADER}}", &render_header(state.identity()))
        .replace("{{BODY}}", &body)
        .replace("{{OVERLAYS}}", &overlays)
}

pub fn render_header(user: Option<&Identity>) -> String {
    let sign_out = match user {
        Some(_) => r#"<form method="post" action="/session/sign-out"><button class="ghost" type="submit" aria-label="Sign Out">Sign Out</button></form>"#,
        None => "",
    };
    format!(r#"<header><h1>MoodCheck</h1>{sign_out}</header>"#)
}

fn render_sign_in(signing_in: bool) -> String {
    let disabled = if signing_in { " disabled" } else { "" };
    format!(
        r#"<section class="panel">
  <p>Track how you feel, one check-in at a time.</p>
  <form method="post" action="/session/sign-in" class="row">
    <input name="display_name" placeholder="Your name" aria-label="Display name" required />
    <button type="submit"{disabled}>Sign In</button>
  </form>
</section>"#
    )
}

pub fn render_mood_form(state: &ViewState, identity: &Identity) -> String {
    let buttons: String = Mood::ALL
        .into_iter()
        .map(|mood| {
            let checked = if state.draft_mood == Some(mood) { " checked" } else { "" };
            format!(
                r#"<label class="mood-btn" title="{label}"><input type="radio" name="mood" value="{label}"{checked} aria-label="{label}" /><span>{emoji}</span></label>"#,
                label = mood.label(),
                emoji = mood.emoji(),
            )
        })
        .collect();

    let submit_label = if state.is_submitting { "Saving..." } else { "SUBMIT" };
    let disabled = if state.is_submitting { " disabled" } else { "" };
    let suggestion = state
        .suggestion
        .as_ref()
        .map(|s| {
            format!(
                r#"<div class="suggestion" role="status"><p>{}</p></div>"#,
                escape_html(s.text())
            )
        })
        .unwrap_or_default();

    format!(
        r#"<section class="panel">
  <p class="muted">Welcome, {name}!</p>
  <form method="post" action="/entries">
    <h3 class="label">Select Mood</h3>
    <div class="mood-grid" role="group" aria-label="Mood selection">{buttons}</div>
    <textarea name="note" rows="3" placeholder="How are you feeling right now? (Optional)" aria-label="Mood note">{note}</textarea>
    <button type="submit"{disabled}>{submit_label}</button>
  </form>
  {suggestion}
</section>"#,
        name = escape_html(&identity.display_name),
        note = escape_html(&state.draft_note),
    )
}

pub fn render_stats_card(stats: Option<&MoodStats>) -> String {
    let Some(stats) = stats else {
        return String::new();
    };
    format!(
        r#"<section class="panel stats">
  <h3 class="label">Weekly Trend (Last {count})</h3>
  <div class="stat-row">
    <div><small>Average</small><strong style="color: {color}">{average}</strong></div>
    <div><small>Best</small><strong>{best}</strong></div>
    <div><small>Worst</small><strong>{worst}</strong></div>
    <div><small>Trend</small><strong>{trend}</strong></div>
  </div>
</section>"#,
        count = stats.count,
        color = stats.color.css(),
        average = stats.average_label(),
        best = stats.max.emoji(),
        worst = stats.min.emoji(),
        trend = stats.trend.symbol(),
    )
}

pub fn render_insights(insights: &[&str]) -> String {
    if insights.is_empty() {
        return String::new();
    }
    let items: String = insights
        .iter()
        .map(|insight| format!("<li>{}</li>", escape_html(insight)))
        .collect();
    format!(r#"<section class="panel"><h3 class="label">💡 Insights</h3><ul class="insights">{items}</ul></section>"#)
}

pub fn render_entry_list(state: &ViewState) -> String {
    let error = state
        .sync_error
        .as_deref()
        .map(|message| {
            format!(
                r#"<div class="error">Error loading data: {}</div>"#,
                escape_html(message)
            )
        })
        .unwrap_or_default();

    let content = if state.loading_entries {
        r#"<p class="muted">Loading history...</p>"#.to_string()
    } else if state.entries.is_empty() {
        r#"<p class="muted">No entries yet. Start tracking!</p>"#.to_string()
    } else {
        state.entries.iter().map(render_entry).collect()
    };

    format!(r#"<section class="panel"><h2>Your Recent Entries</h2>{error}<div class="entries">{content}</div></section>"#)
}

fn render_entry(entry: &MoodEntry) -> String {
    format!(
        r#"<article class="entry">
  <div class="entry-mood" role="img" aria-label="Mood: {label}">{emoji}</div>
  <div><span class="muted">{date}</span><p>{note}</p></div>
  <form method="post" action="/entries/{id}/delete"><button class="ghost" type="submit" title="Delete Entry" aria-label="Delete entry">&times;</button></form>
</article>"#,
        label = entry.mood.label(),
        emoji = entry.mood.emoji(),
        date = format_timestamp(entry.timestamp),
        note = escape_html(&entry.note),
        id = escape_html(&entry.id),
    )
}

fn render_notice(notice: Option<&str>) -> String {
    let Some(message) = notice else {
        return String::new();
    };
    format!(
        r#"<div class="overlay" role="alertdialog"><div class="panel"><p>{}</p><form method="post" action="/notice/dismiss"><button type="submit">OK</button></form></div></div>"#,
        escape_html(message)
    )
}

fn render_confirm(pending_delete: Option<&str>) -> String {
    if pending_delete.is_none() {
        return String::new();
    }
    r#"<div class="overlay" role="dialog"><div class="panel"><p>Delete this entry?</p><form method="post" action="/delete/confirm" class="row"><button name="answer" value="yes" type="submit">Yes</button><button class="ghost" name="answer" value="no" type="submit">No</button></form></div></div>"#.to_string()
}

pub fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(ts) => ts.with_timezone(&Local).format("%b %-d, %H:%M").to_string(),
        None => "Just now".to_string(),
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>MoodCheck</title>
  <style>
    :root {
      --bg: #1d1b2f;
      --panel: rgba(255, 255, 255, 0.08);
      --border: rgba(255, 255, 255, 0.16);
      --ink: #f4f1ff;
      --muted: rgba(244, 241, 255, 0.65);
      --accent: #8c7bff;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, #3a2f6b, var(--bg) 70%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      justify-items: center;
      padding: 32px 18px 48px;
    }

    main {
      width: min(640px, 100%);
      display: grid;
      gap: 16px;
    }

    header, .row, .stat-row {
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 12px;
    }

    .panel {
      background: var(--panel);
      border: 1px solid var(--border);
      border-radius: 16px;
      padding: 20px;
    }

    .label {
      font-size: 0.9rem;
      text-transform: uppercase;
      letter-spacing: 1px;
      color: var(--muted);
    }

    .muted {
      color: var(--muted);
    }

    .mood-grid {
      display: flex;
      gap: 10px;
      margin-bottom: 12px;
    }

    .mood-btn input {
      display: none;
    }

    .mood-btn span {
      font-size: 2rem;
      cursor: pointer;
      padding: 6px;
      border-radius: 12px;
      border: 2px solid transparent;
    }

    .mood-btn input:checked + span {
      border-color: var(--accent);
    }

    textarea, input {
      width: 100%;
      background: rgba(0, 0, 0, 0.2);
      border: 1px solid var(--border);
      border-radius: 10px;
      color: var(--ink);
      padding: 10px;
      margin-bottom: 12px;
    }

    button {
      background: var(--accent);
      color: white;
      border: none;
      border-radius: 10px;
      padding: 10px 18px;
      cursor: pointer;
    }

    button.ghost {
      background: transparent;
      border: 1px solid var(--border);
    }

    button:disabled {
      opacity: 0.7;
    }

    .suggestion {
      margin-top: 12px;
      padding: 12px;
      border-left: 4px solid var(--accent);
      border-radius: 12px;
      background: var(--panel);
    }

    .stat-row div {
      display: grid;
      text-align: center;
    }

    .stat-row strong {
      font-size: 1.5rem;
    }

    .entry {
      display: grid;
      grid-template-columns: auto 1fr auto;
      gap: 12px;
      align-items: start;
      padding: 12px 0;
      border-bottom: 1px solid var(--border);
    }

    .entry-mood {
      font-size: 2rem;
    }

    .error {
      background: rgba(255, 0, 0, 0.2);
      border: 1px solid rgba(255, 0, 0, 0.5);
      border-radius: 8px;
      padding: 12px;
      margin-bottom: 12px;
    }

    .overlay {
      position: fixed;
      inset: 0;
      display: grid;
      place-items: center;
      background: rgba(0, 0, 0, 0.55);
    }
  </style>
</head>
<body>
  <main>
    {{HEADER}}
    {{BODY}}
  </main>
  {{OVERLAYS}}
</body>
</html>
"#;
