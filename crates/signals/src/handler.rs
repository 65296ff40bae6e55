/// Execute an aggregate command: decide, then apply every resulting event.
///
/// The aggregate is mutated in place. Nothing is persisted or published; callers
/// that need that wrap the returned events themselves.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: eventdesk_core::Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        A::apply(aggregate, ev);
    }
    Ok(events)
}
