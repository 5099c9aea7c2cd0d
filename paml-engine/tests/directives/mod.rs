mod include;
mod macros;
