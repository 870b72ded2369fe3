// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reporting of forced changes made while resolving layout commands.

use alloc::string::String;
use alloc::vec::Vec;

/// What a command had to force to keep the layout consistent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    /// A width was switched to fixed.
    FixedWidth,
    /// A height was switched to fixed.
    FixedHeight,
    /// A space-evenly distribution was switched to packed spacing.
    FixedSpacing,
}

/// One notification: a kind of forced change and the names of the affected elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutConflict {
    /// Kind of change.
    pub kind: ConflictKind,
    /// Element names in the order they were first affected, without duplicates.
    pub names: Vec<String>,
}

/// Receives conflict notifications at the end of a command.
pub trait ConflictReporter {
    /// Called once per conflict kind.
    fn report_conflict(&mut self, conflict: &LayoutConflict);
}

impl ConflictReporter for Vec<LayoutConflict> {
    fn report_conflict(&mut self, conflict: &LayoutConflict) {
        self.push(conflict.clone());
    }
}

/// Aggregates conflicts over one command and reports them together.
#[derive(Debug, Default)]
pub(crate) struct ConflictLog {
    entries: Vec<LayoutConflict>,
}

impl ConflictLog {
    pub(crate) fn record(&mut self, kind: ConflictKind, name: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.kind == kind) {
            if !entry.names.iter().any(|n| n == name) {
                entry.names.push(String::from(name));
            }
            return;
        }
        self.entries.push(LayoutConflict {
            kind,
            names: alloc::vec![String::from(name)],
        });
    }

    pub(crate) fn report(self, reporter: &mut dyn ConflictReporter) {
        for entry in &self.entries {
            tracing::debug!(kind = ?entry.kind, names = ?entry.names, "layout conflict resolved");
            reporter.report_conflict(entry);
        }
    }
}
