//! Small steps for `and_then` chains over handler results

use crate::input::Input;

/// Run `f` on the value for its side effect and pass the value on.
///
/// ```
/// use waystation_core::result_helper::observe;
///
/// let result: Result<i32, ()> = Ok(2).and_then(observe(|v: &i32| println!("got {v}")));
/// assert_eq!(result, Ok(2));
/// ```
pub fn observe<T, E, F>(f: F) -> impl Fn(T) -> Result<T, E>
where
    F: Fn(&T),
{
    move |value| {
        f(&value);
        Ok(value)
    }
}

/// Step that ignores its input and succeeds with an empty map
pub fn empty_success_response<T, E>() -> impl Fn(T) -> Result<Input, E> {
    |_| Ok(Input::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_observe_passes_value_through() {
        let seen = Cell::new(0);
        let result: Result<i32, String> = Ok(41)
            .map(|v| v + 1)
            .and_then(observe(|v: &i32| seen.set(*v)));

        assert_eq!(result, Ok(42));
        assert_eq!(seen.get(), 42);
    }

    #[test]
    fn test_observe_skipped_on_failure() {
        let seen = Cell::new(false);
        let result: Result<i32, String> =
            Err("nope".to_string()).and_then(observe(|_: &i32| seen.set(true)));

        assert!(result.is_err());
        assert!(!seen.get());
    }

    #[test]
    fn test_empty_success_response() {
        let result: Result<Input, ()> = Ok("request").and_then(empty_success_response());
        assert_eq!(result, Ok(Input::new()));
    }
}
