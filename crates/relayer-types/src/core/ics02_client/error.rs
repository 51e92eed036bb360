use core::num::ParseIntError;

use flex_error::{define_error, TraceError};

define_error! {
    Error {
        InvalidHeight
            | _ | { "height cannot end up zero or negative" },

        InvalidHeightResult
            | _ | { "height arithmetic resulted in a zero or negative height" },

        HeightConversion
            { height: String }
            [ TraceError<ParseIntError> ]
            | e | { format_args!("cannot convert into a `Height` type from string {0}", e.height) },
    }
}
