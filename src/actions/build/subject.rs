use tracing::{debug, warn};

use crate::context::{Invocation, ResponseBearing, SubjectType};
use crate::pipeline::strategy::{self, Lookup, lookup};
use crate::pipeline::{Abort, Action, Event, Gate};

pub struct SetSubjectType {
    subject_type: Lookup<SubjectType>,
}

impl Default for SetSubjectType {
    fn default() -> Self {
        Self {
            subject_type: lookup(strategy::subject_type),
        }
    }
}

impl SetSubjectType {
    pub fn with_lookup(subject_type: Lookup<SubjectType>) -> Self {
        Self { subject_type }
    }
}

impl Action for SetSubjectType {
    fn name(&self) -> &'static str {
        "set_subject_type"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.response()?;
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let subject_type = (self.subject_type)(inv);
        match subject_type {
            Some(st) => debug!(subject_type = %st, "subject type resolved"),
            None => warn!("subject type could not be resolved"),
        }
        inv.response_mut()?.subject_type = subject_type;
        Ok(())
    }
}

/// Resolves the subject identifier. An unresolvable subject is fatal.
pub struct SetSubject {
    subject: Lookup<String>,
}

impl Default for SetSubject {
    fn default() -> Self {
        Self {
            subject: lookup(strategy::subject),
        }
    }
}

impl SetSubject {
    pub fn with_lookup(subject: Lookup<String>) -> Self {
        Self { subject }
    }
}

impl Action for SetSubject {
    fn name(&self) -> &'static str {
        "set_subject"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.response()?;
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let subject = (self.subject)(inv)
            .ok_or_else(|| Abort::new(Event::InvalidSubject, "subject could not be resolved"))?;
        debug!(subject = %subject, "subject resolved");
        inv.response_mut()?.subject = Some(subject);
        Ok(())
    }
}
