#[cfg(test)]
pub mod test {
    use std::collections::HashMap;
    use std::time::Duration;

    use serde::Serialize;

    use crate::schema;

    #[derive(Debug, Default, PartialEq)]
    pub struct Cfg {
        pub should_be_skipped: String,
        pub name: String,
        pub prio: i32,
        pub immutable: bool,
        pub numeric_levels: Vec<i32>,
        pub levels: Vec<String>,
        pub timeout: Duration,
        pub config_store: ConfigStore,
        pub target_secrets: Vec<TargetSecret>,
    }

    schema! {
        Cfg {
            should_be_skipped,
            name => "{'name':'name','desc':'the name of the config'}",
            prio => "{'name':'prio','desc':'the prio','default':0}",
            immutable => "{'name':'immutable','desc':'can be modified or not','default':false}",
            numeric_levels => "{'name':'numeric-levels','desc':'allowed levels','default':[1,2]}",
            levels => "{'name':'levels','desc':'allowed levels','default':['a','b']}",
            timeout => "{'name':'timeout','desc':'how long to wait','default':'90s'}",
            config_store => "{'name':'config-store','desc':'the config store'}",
            target_secrets => "{'name':'target-secrets','desc':'list of target secrets','default':[{'name':'mysecret','key':'sdlfks','count':231},{'name':'mysecret','key':'sdlfks','count':231}]}",
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct ConfigStore {
        pub file_path: String,
        pub target_secret: TargetSecret,
    }

    schema! {
        ConfigStore {
            file_path => "{'name':'file-path','desc':'the path','default':'configs/'}",
            target_secret => "{'name':'target-secret','desc':'the secret'}",
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct TargetSecret {
        pub name: String,
        pub key: String,
        pub count: i32,
    }

    schema! {
        TargetSecret {
            name => "{'name':'name','desc':'the name of the secret'}",
            key => "{'name':'key','desc':'the key'}",
            count => "{'name':'count','desc':'the count','default':0}",
        }
    }

    // -- Fixtures for casting structures from mappings ---------------------------

    #[derive(Debug, Default, PartialEq)]
    pub struct Nested {
        pub field_a: f64,
    }

    schema! {
        Nested {
            field_a => "{'name':'field_a'}",
        }
    }

    #[derive(Debug, Default, PartialEq)]
    pub struct Outer {
        pub field_1: String,
        pub field_2: i32,
        pub field_3: Nested,
        pub field_4: Vec<i32>,
        pub field_5: Vec<Nested>,
        pub ignored: bool,
    }

    schema! {
        Outer {
            field_1 => "{'name':'field_1'}",
            field_2 => "{'name':'field_2'}",
            field_3 => "{'name':'field_3'}",
            field_4 => "{'name':'field_4'}",
            field_5 => "{'name':'field_5'}",
            ignored,
        }
    }

    // -- Fixtures for failure paths ----------------------------------------------

    #[derive(Debug, Default)]
    pub struct Unexported {
        pub field_1: String,
    }

    schema! {
        Unexported {
            #[readonly] field_1 => "{'name':'field_1','default':'value'}",
        }
    }

    #[derive(Debug, Default)]
    pub struct Malformed {
        pub prio: i32,
    }

    schema! {
        Malformed {
            prio => "{'name':'prio'",
        }
    }

    #[derive(Debug, Default)]
    pub struct MalformedInner {
        pub broken: i32,
    }

    schema! {
        MalformedInner {
            broken => "{'name':'broken','default':",
        }
    }

    #[derive(Debug, Default)]
    pub struct NestedMalformed {
        pub outer: MalformedInner,
    }

    schema! {
        NestedMalformed {
            outer => "{'name':'outer'}",
        }
    }

    #[derive(Debug, Default)]
    pub struct BadDefault {
        pub count: u8,
    }

    schema! {
        BadDefault {
            count => "{'name':'count','default':'lots'}",
        }
    }

    #[derive(Debug, Default)]
    pub struct WithMap {
        pub labels: HashMap<String, String>,
    }

    schema! {
        WithMap {
            labels => "{'name':'labels'}",
        }
    }

    #[derive(Debug, Default)]
    pub struct Duplicated {
        pub port: u16,
        pub other_port: u16,
    }

    schema! {
        Duplicated {
            port => "{'name':'port','default':80}",
            other_port => "{'name':'port','default':8080}",
        }
    }

    #[derive(Debug, Default)]
    pub struct Holder {
        pub store: Option<ConfigStore>,
    }

    schema! {
        Holder {
            store => "{'name':'store'}",
        }
    }

    #[derive(Debug, Default)]
    pub struct RenamedStore {
        pub count_value: u8,
    }

    schema! {
        RenamedStore {
            count_value => "{'name':'count','default':'lots'}",
        }
    }

    /// Rust field names differ from the annotation names.
    #[derive(Debug, Default)]
    pub struct Renamed {
        pub store_field: RenamedStore,
    }

    schema! {
        Renamed {
            store_field => "{'name':'config-store'}",
        }
    }

    #[derive(Debug, Default)]
    pub struct RenamedMap {
        pub labels_map: HashMap<String, String>,
    }

    schema! {
        RenamedMap {
            labels_map => "{'name':'labels'}",
        }
    }

    #[derive(Debug, Default)]
    pub struct RenamedMalformed {
        pub prio_field: i32,
    }

    schema! {
        RenamedMalformed {
            prio_field => "{'name':'prio'",
        }
    }

    #[derive(Debug, Default)]
    pub struct Big {
        pub limit: u64,
    }

    schema! {
        Big {
            limit => "{'name':'limit','default':18446744073709551615}",
        }
    }

    // -- Fixtures for the end-to-end scenarios -----------------------------------

    #[derive(Debug, Default, PartialEq)]
    pub struct Job {
        pub prio: i32,
        pub name: String,
    }

    schema! {
        Job {
            prio => "{'name':'prio','default':0}",
            name => "{'name':'name','default':''}",
        }
    }

    #[derive(Debug, Default, PartialEq)]
    pub struct Db {
        pub db_url: String,
        pub pool_size: usize,
    }

    schema! {
        Db {
            db_url => "{'name':'db-url','desc':'connection string'}",
            pool_size => "{'name':'pool-size','desc':'connection pool size','default':5}",
        }
    }

    /// Serializable source for programmatic overrides.
    #[derive(Serialize, Default)]
    pub struct DbOverrides {
        #[serde(rename = "db-url")]
        pub db_url: Option<String>,
        #[serde(rename = "pool-size")]
        pub pool_size: Option<usize>,
    }

    #[test]
    fn fixture_defaults_are_zero_values() {
        let cfg = Cfg::default();
        assert_eq!(cfg.prio, 0);
        assert!(cfg.target_secrets.is_empty());
        assert_eq!(cfg.config_store.file_path, "");
    }
}
