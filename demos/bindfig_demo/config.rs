use std::path::PathBuf;
use std::time::Duration;

use bindfig::schema;

#[derive(Debug, Default)]
pub struct DemoConfig {
    pub name: String,
    pub verbose: bool,
    pub timeout: Duration,
    pub levels: Vec<String>,
    pub server: ServerConfig,
    pub secrets: Vec<Secret>,
}

schema! {
    DemoConfig {
        name => "{'name':'name','desc':'name shown in the greeting','default':'world'}",
        verbose => "{'name':'verbose','desc':'print every resolved value','default':false}",
        timeout => "{'name':'timeout','desc':'request timeout','default':'30s'}",
        levels => "{'name':'levels','desc':'enabled log levels','default':['info','warn']}",
        server => "{'name':'server','desc':'server settings'}",
        secrets => "{'name':'secrets','desc':'secrets to mount','default':[]}",
    }
}

#[derive(Debug, Default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub root: PathBuf,
}

schema! {
    ServerConfig {
        host => "{'name':'host','desc':'listen address','default':'127.0.0.1'}",
        port => "{'name':'port','desc':'listen port','default':8080}",
        root => "{'name':'root','desc':'directory to serve'}",
    }
}

#[derive(Debug, Default)]
pub struct Secret {
    pub name: String,
    pub key: String,
}

schema! {
    Secret {
        name => "{'name':'name','desc':'secret name'}",
        key => "{'name':'key','desc':'secret key'}",
    }
}
