mod lists;
mod renderers;
