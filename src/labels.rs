use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};

const FLAG_SEPARATOR: char = '|';

/// How decisions are entered in the side panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LabelScheme {
    /// One button per label.
    Buttons(Vec<String>),
    /// A set of flags plus a success/failure verdict.
    Checklist(Vec<String>),
}

impl LabelScheme {
    pub fn buttons(labels: Vec<String>) -> Result<Self> {
        validate(&labels, false)?;
        Ok(LabelScheme::Buttons(labels))
    }

    pub fn checklist(boxes: Vec<String>) -> Result<Self> {
        validate(&boxes, true)?;
        Ok(LabelScheme::Checklist(boxes))
    }

    /// Number keys are bound to buttons only for small label sets.
    pub fn shortcut_count(&self) -> usize {
        match self {
            LabelScheme::Buttons(labels) if labels.len() < 9 => labels.len(),
            _ => 0,
        }
    }

    /// Human-readable form of a stored label.
    pub fn describe(&self, label: &str) -> String {
        match self {
            LabelScheme::Checklist(_) => match ChecklistLabel::parse(label) {
                Some(c) => c.to_string(),
                None => label.to_string(),
            },
            LabelScheme::Buttons(_) => label.to_string(),
        }
    }

    /// Checkbox states encoded in `label`, or all clear if it is not a checklist label.
    pub fn checked_boxes(&self, label: &str) -> Vec<bool> {
        match self {
            LabelScheme::Checklist(boxes) => match ChecklistLabel::parse(label) {
                Some(c) => c.checked(boxes),
                None => vec![false; boxes.len()],
            },
            LabelScheme::Buttons(_) => vec![],
        }
    }
}

fn validate(names: &[String], checklist: bool) -> Result<()> {
    if names.is_empty() {
        return Err(Error::Labels("at least one label is required".to_string()));
    }
    let mut seen = HashSet::new();
    for n in names {
        if n.trim().is_empty() {
            return Err(Error::Labels("labels must not be empty".to_string()));
        }
        if checklist && n.contains(FLAG_SEPARATOR) {
            return Err(Error::Labels(format!("checklist entry {:?} contains '{}'", n, FLAG_SEPARATOR)));
        }
        if !seen.insert(n.as_str()) {
            return Err(Error::Labels(format!("duplicate label {:?}", n)));
        }
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failure,
}

impl Verdict {
    fn code(self) -> &'static str {
        match self {
            Verdict::Success => "s",
            Verdict::Failure => "f",
        }
    }
}

/// Checklist decision packed into the single label column, e.g. `s|deep eclipse|bad incl`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChecklistLabel {
    pub verdict: Verdict,
    pub flags: Vec<String>,
}

impl ChecklistLabel {
    /// Collects the names of the ticked boxes.
    pub fn from_boxes(verdict: Verdict, boxes: &[String], checked: &[bool]) -> Self {
        let flags = boxes
            .iter()
            .zip(checked)
            .filter(|(_, on)| **on)
            .map(|(b, _)| b.clone())
            .collect();
        Self { verdict, flags }
    }

    pub fn to_label(&self) -> String {
        let mut out = self.verdict.code().to_string();
        for f in &self.flags {
            out.push(FLAG_SEPARATOR);
            out.push_str(f);
        }
        out
    }

    pub fn parse(label: &str) -> Option<Self> {
        let mut parts = label.split(FLAG_SEPARATOR);
        let verdict = match parts.next()? {
            "s" => Verdict::Success,
            "f" => Verdict::Failure,
            _ => return None,
        };
        let flags = parts.map(str::to_string).collect();
        Some(Self { verdict, flags })
    }

    /// Inverse of `from_boxes`; flags not in `boxes` are ignored.
    pub fn checked(&self, boxes: &[String]) -> Vec<bool> {
        boxes.iter().map(|b| self.flags.contains(b)).collect()
    }
}

impl fmt::Display for ChecklistLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.verdict)?;
        if !self.flags.is_empty() {
            write!(f, " ({})", self.flags.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn checklist_label_encoding() {
        let boxes = names(&["deep eclipse", "bad period", "bad incl"]);
        let label = ChecklistLabel::from_boxes(Verdict::Success, &boxes, &[true, false, true]);
        assert_eq!(label.to_label(), "s|deep eclipse|bad incl");
        assert_eq!(ChecklistLabel::parse("s|deep eclipse|bad incl"), Some(label));

        let bare = ChecklistLabel::from_boxes(Verdict::Failure, &boxes, &[false, false, false]);
        assert_eq!(bare.to_label(), "f");
        assert_eq!(ChecklistLabel::parse("f").unwrap().flags.len(), 0);
        assert!(ChecklistLabel::parse("yes").is_none());
    }

    #[test]
    fn stored_checklist_label_restores_boxes() {
        let scheme = LabelScheme::checklist(names(&["deep eclipse", "bad period", "bad incl"])).unwrap();
        assert_eq!(scheme.checked_boxes("s|bad incl|renamed"), vec![false, false, true]);
        assert_eq!(scheme.checked_boxes("junk"), vec![false, false, false]);
        assert_eq!(scheme.describe("s|deep eclipse|bad incl"), "Success (deep eclipse, bad incl)");
        assert_eq!(scheme.describe("f"), "Failure");

        let buttons = LabelScheme::buttons(names(&["yes", "no"])).unwrap();
        assert_eq!(buttons.describe("s|x"), "s|x");
        assert!(buttons.checked_boxes("yes").is_empty());
    }

    #[test]
    fn label_sets_are_validated() {
        assert!(LabelScheme::buttons(vec![]).is_err());
        assert!(LabelScheme::buttons(names(&["yes", "yes"])).is_err());
        assert!(LabelScheme::buttons(names(&["yes", " "])).is_err());
        assert!(LabelScheme::checklist(names(&["a|b"])).is_err());
        assert!(LabelScheme::buttons(names(&["a|b"])).is_ok());
    }

    #[test]
    fn shortcuts_only_for_small_button_sets() {
        let small = LabelScheme::buttons(names(&["good", "half", "double", "other"])).unwrap();
        assert_eq!(small.shortcut_count(), 4);
        let big: Vec<String> = (0..9).map(|i| format!("c{}", i)).collect();
        assert_eq!(LabelScheme::buttons(big).unwrap().shortcut_count(), 0);
        assert_eq!(LabelScheme::checklist(names(&["a"])).unwrap().shortcut_count(), 0);
    }
}
