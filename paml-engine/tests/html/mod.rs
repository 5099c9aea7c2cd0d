mod shapes;
mod text;
