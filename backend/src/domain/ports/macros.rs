//! `define_port_error!` builds a port error enum plus snake_case constructors
//! whose parameters accept anything convertible into the field type.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
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
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use crate::domain::BookingId;

    define_port_error! {
        pub enum LedgerError {
            Offline { message: String } => "ledger offline: {message}",
            Locked => "ledger locked",
            Clash { booking_id: BookingId, attempts: u32 } => "clash with {booking_id} after {attempts} attempts",
        }
    }

    #[test]
    fn string_fields_take_str_slices() {
        assert_eq!(LedgerError::offline("pool drained").to_string(), "ledger offline: pool drained");
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(LedgerError::locked(), LedgerError::Locked);
    }

    #[test]
    fn typed_fields_keep_their_types() {
        let id = BookingId::random();
        let err = LedgerError::clash(id, 3_u32);
        assert_eq!(err.to_string(), format!("clash with {id} after 3 attempts"));
    }
}
