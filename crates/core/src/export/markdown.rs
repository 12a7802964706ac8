//! Markdown rendering for chapters and the story bible.

use std::fmt::Write;

use super::ExportChapter;
use crate::bible::{BibleSnapshot, CharacterEntry, FactionEntry, WorldSection};

/// `# {title}` per chapter followed by blank-line separated paragraphs.
pub fn render_chapters_markdown(chapters: &[ExportChapter]) -> String {
    chapters
        .iter()
        .enumerate()
        .map(|(i, chapter)| {
            let mut block = format!("# {}\n", chapter.display_title(i));
            let paragraphs = chapter.paragraphs();
            if !paragraphs.is_empty() {
                block.push('\n');
                block.push_str(&paragraphs.join("\n\n"));
                block.push('\n');
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the whole bible. Empty sections are left out.
pub fn render_bible_markdown(bible: &BibleSnapshot) -> String {
    let mut out = String::from("# Story Bible\n");

    if let Some(world) = bible.world.as_ref().filter(|w| !w.is_empty()) {
        render_world(&mut out, world);
    }

    if !bible.characters.is_empty() {
        out.push_str("\n## Characters\n");
        for character in &bible.characters {
            render_character(&mut out, character);
        }
    }

    if !bible.relationships.is_empty() {
        out.push_str("\n## Relationships\n\n");
        for rel in &bible.relationships {
            let _ = write!(out, "- **{}** → **{}** ({})", rel.source, rel.target, rel.rel_type);
            if let Some(evolution) = non_blank(rel.evolution.as_deref()) {
                let _ = write!(out, ": {evolution}");
            }
            out.push('\n');
        }
    }

    if !bible.locations.is_empty() {
        out.push_str("\n## Locations\n");
        for location in &bible.locations {
            let _ = writeln!(out, "\n### {}\n", location.name);
            field(&mut out, "Type", location.location_type.as_deref());
            field(&mut out, "Significance", location.significance.as_deref());
            field(&mut out, "Atmosphere", location.atmosphere.as_deref());
        }
    }

    if !bible.factions.is_empty() {
        out.push_str("\n## Factions\n");
        for faction in &bible.factions {
            render_faction(&mut out, faction);
        }
    }

    if !bible.timeline.is_empty() {
        out.push_str("\n## Timeline\n\n");
        for event in &bible.timeline {
            match non_blank(event.event_date.as_deref()) {
                Some(date) => {
                    let _ = writeln!(out, "- **{date}**: {}", event.description);
                }
                None => {
                    let _ = writeln!(out, "- {}", event.description);
                }
            }
        }
    }

    if !bible.arcs.is_empty() {
        out.push_str("\n## Arcs\n");
        for arc in &bible.arcs {
            let mut tags: Vec<String> = Vec::new();
            if let Some(t) = arc.arc_type {
                tags.push(t.to_string());
            }
            if let Some(s) = arc.status {
                tags.push(s.to_string());
            }
            if let Some(p) = arc.progress {
                tags.push(format!("{p}%"));
            }
            if tags.is_empty() {
                let _ = writeln!(out, "\n### {}\n", arc.name);
            } else {
                let _ = writeln!(out, "\n### {} ({})\n", arc.name, tags.join(", "));
            }
            list_field(&mut out, "Characters", &arc.main_characters);
        }
    }

    if !bible.foreshadowing.is_empty() {
        out.push_str("\n## Foreshadowing\n\n");
        for thread in &bible.foreshadowing {
            let status = thread.status.map(|s| s.as_str()).unwrap_or("active");
            let _ = write!(out, "- [{status}] {}", thread.content);
            if let Some(payoff) = non_blank(thread.planned_payoff.as_deref()) {
                let _ = write!(out, " (payoff: {payoff})");
            }
            out.push('\n');
        }
    }

    if !bible.hooks.is_empty() {
        out.push_str("\n## Hooks\n\n");
        for hook in &bible.hooks {
            let mut tags = vec![hook.hook_type.to_string()];
            if let Some(style) = hook.style {
                tags.push(style.to_string());
            }
            if let Some(strength) = hook.strength {
                tags.push(strength.to_string());
            }
            let _ = writeln!(out, "- [{}] {}", tags.join("/"), hook.content);
        }
    }

    out
}

fn render_world(out: &mut String, world: &WorldSection) {
    out.push_str("\n## World\n");
    if let Some(power) = &world.power_system {
        match non_blank(power.name.as_deref()) {
            Some(name) => {
                let _ = writeln!(out, "\n### Power System: {name}\n");
            }
            None => out.push_str("\n### Power System\n\n"),
        }
        if !power.levels.is_empty() {
            let _ = writeln!(out, "- Levels: {}", power.levels.join(" → "));
        }
        list_field(out, "Core rules", &power.core_rules);
        list_field(out, "Constraints", &power.constraints);
    }
    if !world.social_rules.is_empty() {
        out.push_str("\n### Social Rules\n\n");
        for (key, value) in &world.social_rules {
            let _ = writeln!(out, "- **{key}**: {value}");
        }
    }
}

fn render_character(out: &mut String, character: &CharacterEntry) {
    match character.role {
        Some(role) => {
            let _ = writeln!(out, "\n### {} ({role})\n", character.name);
        }
        None => {
            let _ = writeln!(out, "\n### {}\n", character.name);
        }
    }
    field(out, "Appearance", character.appearance.as_deref());
    if let Some(conflict) = character.conflict_type {
        let _ = writeln!(out, "- Conflict: {conflict}");
    }
    if let Some(m) = &character.motivation {
        field(out, "Surface motivation", m.surface.as_deref());
        field(out, "Hidden motivation", m.hidden.as_deref());
        field(out, "Core motivation", m.core.as_deref());
    }
    if let Some(f) = &character.facets {
        field(out, "In public", f.public.as_deref());
        field(out, "In private", f.private.as_deref());
        field(out, "Hidden side", f.hidden.as_deref());
        field(out, "Under pressure", f.under_pressure.as_deref());
    }
    if let Some(arc) = &character.arc {
        if let (Some(start), Some(end)) = (
            non_blank(arc.start_state.as_deref()),
            non_blank(arc.end_state.as_deref()),
        ) {
            let _ = writeln!(out, "- Arc: {start} → {end}");
        }
    }
    for sample in &character.voice_samples {
        let _ = writeln!(out, "\n> {sample}");
    }
}

fn render_faction(out: &mut String, faction: &FactionEntry) {
    let _ = writeln!(out, "\n### {}\n", faction.name);
    field(out, "Type", faction.faction_type.as_deref());
    field(out, "Leader", faction.leader.as_deref());
    if let Some(stance) = faction.stance_to_mc {
        let _ = writeln!(out, "- Stance: {stance}");
    }
    list_field(out, "Goals", &faction.goals);
    list_field(out, "Resources", &faction.resources);
    field(out, "Internal conflict", faction.internal_conflict.as_deref());
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn field(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = non_blank(value) {
        let _ = writeln!(out, "- {label}: {value}");
    }
}

fn list_field(out: &mut String, label: &str, values: &[String]) {
    if !values.is_empty() {
        let _ = writeln!(out, "- {label}: {}", values.join(", "));
    }
}
