//! `define_port_error!`, the generator behind every driven-port error enum.
//!
//! [`RoutingProviderError`](super::RoutingProviderError),
//! [`OptimizationCacheError`](super::OptimizationCacheError) and the route
//! plan and metrics errors are declared as `Variant { field: Type } =>
//! "display"` lines. The macro derives `thiserror::Error` with that message
//! and adds one snake_case constructor per variant, so adapters write
//! `RoutingProviderError::status("ZERO_RESULTS", detail)` with any
//! `impl Into` arguments.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@constructor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };

    (@constructor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@constructor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@arguments $variant [] [] $( $field : $ty, )*);
    };

    // Accumulates `field: impl Into<Type>` parameters and `.into()` initialisers.
    (@arguments $variant:ident [$($params:tt)*] [$($inits:tt)*] $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @arguments
            $variant
            [$($params)* $field: impl Into<$ty>,]
            [$($inits)* $field: $field.into(),]
            $($rest)*
        );
    };

    (@arguments $variant:ident [$($params:tt)*] [$($inits:tt)*]) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Constructor generation for port error enums.
    define_port_error! {
        pub enum SampleAdapterError {
            Timeout { message: String } => "adapter timed out: {message}",
            Upstream { status: u16 } => "upstream answered {status}",
            Rejected { status: String, message: String } => "rejected with {status}: {message}",
        }
    }

    #[test]
    fn string_fields_accept_str_slices() {
        let err = SampleAdapterError::timeout("10s elapsed");
        assert_eq!(err.to_string(), "adapter timed out: 10s elapsed");
    }

    #[test]
    fn numeric_fields_keep_their_type() {
        let err = SampleAdapterError::upstream(503_u16);
        assert_eq!(err, SampleAdapterError::Upstream { status: 503 });
    }

    #[test]
    fn multi_field_variants_take_arguments_in_declaration_order() {
        let err = SampleAdapterError::rejected("ZERO_RESULTS", "no route");
        assert_eq!(err.to_string(), "rejected with ZERO_RESULTS: no route");
    }
}
