/// Orders responses within one refresh cycle.
///
/// Each fetch takes a ticket before it is sent; a response is applied only if
/// its ticket is newer than the last applied one. When cycles run strictly
/// one after another every response is accepted, but a slower response that
/// resolves after a newer one is dropped instead of overwriting fresher data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceGate {
    issued: u64,
    applied: Option<u64>,
}

impl SequenceGate {
    pub fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    pub fn accept(&mut self, ticket: u64) -> bool {
        if self.applied.is_some_and(|last| ticket <= last) {
            return false;
        }
        self.applied = Some(ticket);
        true
    }
}
