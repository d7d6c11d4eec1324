//! Exit code constants for the actionlock CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid input, invalid lock key)
//! - 2: An action handler failed while holding its lock
//! - 3: Lock key could not be resolved (owner lookup failed)
//! - 4: Lock acquisition timed out

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unreadable files, invalid config or key.
pub const USER_ERROR: i32 = 1;

/// At least one action failed during execution.
pub const ACTION_FAILURE: i32 = 2;

/// Owner/controller lookup failed while deriving a lock key.
pub const KEY_RESOLUTION_FAILURE: i32 = 3;

/// Lock acquisition failure: the key stayed contended past the wait budget.
pub const LOCK_FAILURE: i32 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            SUCCESS,
            USER_ERROR,
            ACTION_FAILURE,
            KEY_RESOLUTION_FAILURE,
            LOCK_FAILURE,
        ];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn lock_failure_keeps_its_code() {
        assert_eq!(SUCCESS, 0);
        assert_eq!(LOCK_FAILURE, 4);
    }
}
