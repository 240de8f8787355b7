mod fetchers;
mod support;
