use std::slice::Iter;

use log::debug;

use super::errors::{Error, ErrorImpl, ErrorKind};
use crate::Position;

/// The error sink shared by every pass of one run.
///
/// Passes push into it instead of returning early, so a single run reports every
/// independent problem. The order of insertion is preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    errors: Vec<Error>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics { errors: vec![] }
    }

    pub fn report(&mut self, error_impl: ErrorImpl, position: Position) {
        let error = Error::new(error_impl, position);
        debug!("Reporting {}", error);
        self.errors.push(error);
    }

    pub fn push(&mut self, error: Error) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> Iter<'_, Error> {
        self.errors.iter()
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<Error> {
        self.errors
    }

    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.errors.iter().map(Error::kind).collect()
    }

    pub fn count(&self, kind: ErrorKind) -> usize {
        self.errors.iter().filter(|error| error.kind() == kind).count()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Error;
    type IntoIter = Iter<'a, Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
