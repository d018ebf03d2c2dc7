macro_rules! nutype_string {
    ($ident:ident($($args:tt)*)) => {
        #[::nutype::nutype(
            $($args)*,
            derive(
                Debug,
                Clone,
                PartialEq,
                Eq,
                Hash,
                Deref,
                Display,
                TryFrom,
                Serialize,
                Deserialize
            )
        )]
        pub struct $ident(String);
    };
}

macro_rules! id {
    ($ident:ident) => {
        #[::nutype::nutype(derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Deref,
            Display,
            From,
            Serialize,
            Deserialize,
        ))]
        pub struct $ident(i32);
    };
}

pub(crate) use id;
pub(crate) use nutype_string;
