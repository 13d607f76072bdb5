use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Resolve once, before anything could spawn a thread; falls back to UTC
/// when the platform refuses.
pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// Wall-clock time at `offset`, truncated to whole seconds.
pub fn local_now(offset: UtcOffset) -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc().to_offset(offset);
    let now = now.replace_nanosecond(0).unwrap_or(now);
    PrimitiveDateTime::new(now.date(), now.time())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_has_whole_seconds() {
        assert_eq!(local_now(UtcOffset::UTC).nanosecond(), 0);
    }
}
