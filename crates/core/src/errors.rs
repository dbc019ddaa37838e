/* 
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. 
If a copy of the MPL was not distributed with this file, 
You can obtain one at https://mozilla.org/MPL/2.0/. 
*/

//! Errors raised by the library.
//! 
//! Configuration is the only fallible operation on a timer; everything else 
//! (starting, stopping, ticking...) is total over its documented inputs.

use crate::types::{LoopCount, Seconds};

/// Raised synchronously when a timer is asked to take on a configuration it cannot honor.
/// 
/// Whenever this is returned, the timer the configuration was meant for is left 
/// exactly as it was - configuration is all-or-nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerConfigError {
    /// The duration was zero, negative or NaN. Carries the rejected value.
    NonPositiveDuration(Seconds),

    /// A one-shot timer cannot also have a loop bound. Carries the rejected loop bound.
    OneShotWithLoopLimit(LoopCount),
}

impl TimerConfigError {
    /// Both variants are flavors of the same InvalidConfiguration failure; 
    /// this is a convenience for callers that do not care which one it was.
    pub fn is_invalid_configuration(&self) -> bool {
        match self {
            Self::NonPositiveDuration(_) => true,
            Self::OneShotWithLoopLimit(_) => true,
        }
    }
}

impl core::fmt::Display for TimerConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NonPositiveDuration(duration) => write!(
                f, "invalid timer configuration: duration must be greater than 0 (got {})", duration
            ),
            Self::OneShotWithLoopLimit(loops) => write!(
                f, "invalid timer configuration: a one-shot timer cannot stop after {} loops", loops
            ),
        }
    }
}

impl core::error::Error for TimerConfigError {}

/// Checks the duration precondition shared by every configuration entrypoint.
pub(crate) fn check_duration(duration: Seconds) -> Result<(), TimerConfigError> {
    // Written this way round so that NaN fails too.
    if !(duration > 0.) {
        return Err(TimerConfigError::NonPositiveDuration(duration));
    }
    Ok(())
}

/// Checks that the one-shot flag and the loop bound do not contradict each other.
pub(crate) fn check_loop_mode(one_shot: bool, loop_stop_count: LoopCount) -> Result<(), TimerConfigError> {
    if one_shot && loop_stop_count > 0 {
        return Err(TimerConfigError::OneShotWithLoopLimit(loop_stop_count));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_rejects_zero_negative_and_nan_durations() {
        assert_eq!(check_duration(0.), Err(TimerConfigError::NonPositiveDuration(0.)));
        assert_eq!(check_duration(-5.), Err(TimerConfigError::NonPositiveDuration(-5.)));
        assert!(check_duration(f32::NAN).is_err());
        assert!(check_duration(0.001).is_ok());
    }

    #[test]
    fn test_rejects_one_shot_with_loop_limit() {
        assert_eq!(check_loop_mode(true, 3), Err(TimerConfigError::OneShotWithLoopLimit(3)));
        assert!(check_loop_mode(true, 0).is_ok());
        assert!(check_loop_mode(false, 3).is_ok());
    }

    #[test]
    fn test_display_mentions_the_offending_value() {
        let msg = TimerConfigError::OneShotWithLoopLimit(7).to_string();
        assert!(msg.contains("7"));
        assert!(TimerConfigError::NonPositiveDuration(-1.).is_invalid_configuration());
    }
}
